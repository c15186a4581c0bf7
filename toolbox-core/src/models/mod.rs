//! Domain models for the toolbox.
//!
//! ## Submodules
//!
//! - [`repository`] - Tracked repositories (ToolRepository)
//! - [`release`] - Release data (ReleaseRecord, ReleaseSnapshot)
//! - [`installed`] - Host-installed tools (InstalledTool)
//! - [`credential`] - Upstream access token (Credential)
//! - [`view`] - Merged render data (ToolboxView, ToolView, Notice)

mod credential;
mod installed;
mod release;
mod repository;
mod view;

pub use credential::Credential;
pub use installed::InstalledTool;
pub use release::{ReleaseRecord, ReleaseSnapshot, UNKNOWN};
pub use repository::{TRACKED_REPOSITORIES, ToolRepository};
pub use view::{
    InstallStatus, Notice, NoticeLevel, PromptReason, ToolView, ToolboxView, merge_installed,
};
#[cfg(test)]
mod serde_tests;
