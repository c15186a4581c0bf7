// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Toolbox Core
//!
//! Core types, models, and traits for the DHIS2 toolbox.
//!
//! This crate provides the foundational abstractions used across all other
//! toolbox crates:
//!
//! - Domain models (repositories, release records, snapshots, installed tools)
//! - Error types
//! - Collaborator traits for the sync logic
//!
//! ## Key Types
//!
//! ### Release Types
//! - [`ToolRepository`] - `owner/name` identifier of a tracked repository
//! - [`ReleaseRecord`] - Latest release of one repository
//! - [`ReleaseSnapshot`] - All records from one fetch cycle
//!
//! ### Host Types
//! - [`InstalledTool`] - App installed in the host
//! - [`Credential`] - Upstream API access token
//!
//! ### View Types
//! - [`ToolboxView`] - Merged, sorted data for one render
//! - [`Notice`] - Transient user notification

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;

pub use models::{
    // Release types
    ReleaseRecord,
    ReleaseSnapshot,
    TRACKED_REPOSITORIES,
    ToolRepository,
    UNKNOWN,
    // Host types
    Credential,
    InstalledTool,
    // View types
    InstallStatus,
    Notice,
    NoticeLevel,
    PromptReason,
    ToolView,
    ToolboxView,
    merge_installed,
};

pub use traits::{
    CredentialValidator, InstalledToolsProvider, Presenter, ReleaseSource, StaticInstalledTools,
};
