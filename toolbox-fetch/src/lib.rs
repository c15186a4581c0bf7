// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Toolbox Fetch
//!
//! Upstream API clients and host APIs for the DHIS2 toolbox.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::keychain`] - User-scoped secret storage (system keychain)
//! - [`host::http`] - HTTP client with tracing, deadlines and domain allowlist
//!
//! ## Upstreams
//!
//! - [`github`] - Latest releases and manifests, credential validation
//! - [`dhis2`] - Installed apps and the `dataStore` of a DHIS2 instance
//!
//! ## Example
//!
//! ```ignore
//! use toolbox_core::{Credential, ReleaseSource, ToolRepository};
//! use toolbox_fetch::{FetchContext, FetchSettings, ReleaseFetcher};
//!
//! let ctx = FetchContext::new(FetchSettings::default())?;
//! let fetcher = ReleaseFetcher::new(ctx.github.clone());
//!
//! let snapshot = fetcher
//!     .fetch_all(&ToolRepository::tracked(), &Credential::new(token))
//!     .await;
//! ```

pub mod context;
pub mod dhis2;
pub mod error;
pub mod github;
pub mod host;

pub use context::{FetchContext, FetchSettings};
pub use dhis2::{Dhis2AppsProvider, Dhis2Auth, Dhis2Client};
pub use error::{FetchError, HttpError, KeychainError};
pub use github::{GitHubClient, GitHubCredentialValidator, ReleaseFetcher};
pub use host::{HttpClient, KeychainApi, MemoryKeychain, SystemKeychain, with_deadline};
