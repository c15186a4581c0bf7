//! Merged view handed to the presentation layer.
//!
//! - [`ToolView`] - One release joined with its installed state
//! - [`ToolboxView`] - Everything a render needs
//! - [`Notice`] - Transient user notification

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::installed::InstalledTool;
use super::release::{ReleaseRecord, ReleaseSnapshot, sort_by_name};

// ============================================================================
// Install Status
// ============================================================================

/// Whether a tracked tool is installed in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallStatus {
    /// Installed at the given version.
    Installed {
        /// Installed version string.
        version: String,
    },
    /// Not present in the host.
    NotInstalled,
}

impl InstallStatus {
    /// Returns the installed version, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Installed { version } => Some(version),
            Self::NotInstalled => None,
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed { version } => f.write_str(version),
            Self::NotInstalled => f.write_str("Not installed"),
        }
    }
}

// ============================================================================
// Tool View
// ============================================================================

/// A release record joined with the host's installed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolView {
    /// Latest release data.
    pub release: ReleaseRecord,
    /// Installed state in the host.
    pub installed: InstallStatus,
    /// Browser URL of the source repository.
    pub repository_url: String,
}

impl ToolView {
    /// Returns true if the installed version differs from the latest one.
    ///
    /// Tools that are not installed, or whose latest version is unknown,
    /// are never reported as outdated.
    pub fn is_outdated(&self) -> bool {
        match self.installed.version() {
            Some(v) => self.release.version != super::UNKNOWN && v != self.release.version,
            None => false,
        }
    }
}

/// Joins release records with installed tools.
///
/// Matching is case-insensitive name equality; when several installed tools
/// fold to the same name, the first one reported by the host wins. The
/// result is sorted by release name, case-insensitively and stably.
pub fn merge_installed(releases: &[ReleaseRecord], installed: &[InstalledTool]) -> Vec<ToolView> {
    let mut views: Vec<ToolView> = releases
        .iter()
        .map(|release| {
            let installed = installed
                .iter()
                .find(|tool| tool.matches_name(&release.name))
                .map_or(InstallStatus::NotInstalled, |tool| InstallStatus::Installed {
                    version: tool.version.clone(),
                });
            ToolView {
                repository_url: release.repo.html_url(),
                release: release.clone(),
                installed,
            }
        })
        .collect();
    sort_by_name(&mut views, |v| &v.release.name);
    views
}

// ============================================================================
// Toolbox View
// ============================================================================

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolboxView {
    /// When the underlying releases were fetched.
    pub fetched_at: DateTime<Utc>,
    /// True if the releases came from the shared cache.
    pub from_cache: bool,
    /// Tools sorted by name.
    pub tools: Vec<ToolView>,
}

impl ToolboxView {
    /// Builds a view from a snapshot and the host's installed tools.
    pub fn build(snapshot: &ReleaseSnapshot, installed: &[InstalledTool], from_cache: bool) -> Self {
        Self {
            fetched_at: snapshot.fetched_at,
            from_cache,
            tools: merge_installed(&snapshot.releases, installed),
        }
    }

    /// Number of tracked tools installed in the host.
    pub fn installed_count(&self) -> usize {
        self.tools
            .iter()
            .filter(|t| matches!(t.installed, InstallStatus::Installed { .. }))
            .count()
    }
}

// ============================================================================
// Notices & Prompts
// ============================================================================

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something degraded but the view is usable.
    Warning,
    /// An operation failed.
    Error,
}

/// A transient, non-blocking notification for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Creates an info notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Creates a warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Creates an error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Why the credential-entry prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptReason {
    /// No credential is stored yet.
    Missing,
    /// The stored credential was rejected upstream.
    Invalid,
}
