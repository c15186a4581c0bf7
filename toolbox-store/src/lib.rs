// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Toolbox Store
//!
//! State management and sync logic for the DHIS2 toolbox.
//!
//! This crate provides:
//!
//! - **CredentialStore**: The per-user GitHub key in the keychain
//! - **DataStore**: Namespace-scoped key/value backends (file, memory, DHIS2)
//! - **SnapshotCache**: The shared latest-release snapshot
//! - **SettingsStore**: User preferences with persistence
//! - **ToolboxSession**: Cache-or-fetch activation and manual refresh
//!
//! ## Usage
//!
//! ```ignore
//! use toolbox_store::{CredentialStore, FileDataStore, SnapshotCache, ToolboxSession};
//!
//! let mut session = ToolboxSession::builder()
//!     .credentials(CredentialStore::new(keychain))
//!     .cache(SnapshotCache::new(Arc::new(FileDataStore::at_default_location())))
//!     .source(fetcher)
//!     .validator(validator)
//!     .installed(installed)
//!     .presenter(presenter)
//!     .build()?;
//!
//! session.activate().await?;
//! session.refresh().await?;
//! ```

pub mod credential_store;
pub mod data_store;
pub mod error;
pub mod persistence;
pub mod session;
pub mod settings_store;
pub mod snapshot_cache;

pub use credential_store::{CREDENTIAL_KEY, CredentialStore, NAMESPACE};
pub use data_store::{DataStore, Dhis2DataStore, FileDataStore, MemoryDataStore};
pub use error::{StoreError, SyncError};
pub use persistence::{
    default_config_dir, default_data_store_dir, default_settings_path, load_json, save_json,
};
pub use session::{SessionState, ToolboxSession, ToolboxSessionBuilder};
pub use settings_store::{
    CacheSettings, Dhis2Settings, GitHubSettings, InstalledToolsSource, LogLevel, Settings,
    SettingsStore,
};
pub use snapshot_cache::{SNAPSHOT_KEY, SnapshotCache};

#[cfg(test)]
mod persistence_tests;
