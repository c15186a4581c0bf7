//! Fetch settings and context.
//!
//! The fetch context bundles the host APIs and settings needed to build the
//! upstream clients.

use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use crate::github::GitHubClient;
use crate::host::{
    http::DEFAULT_TIMEOUT_SECS,
    keychain::{KeychainApi, SystemKeychain},
};

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for upstream calls.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Base URL of the GitHub REST API.
    pub api_base_url: String,
    /// Deadline applied to every upstream call.
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_GITHUB_API.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FetchSettings {
    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Host APIs and settings shared by the upstream clients.
pub struct FetchContext {
    /// User-scoped secret storage.
    pub keychain: Arc<dyn KeychainApi>,
    /// GitHub API client.
    pub github: Arc<GitHubClient>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with the system keychain and a GitHub client built
    /// from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let github = GitHubClient::new(&settings)?;
        Ok(Self {
            keychain: Arc::new(SystemKeychain::new()),
            github: Arc::new(github),
            settings,
        })
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.api_base_url, "https://api.github.com");
        assert_eq!(settings.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_context_uses_settings() {
        let settings = FetchSettings::default()
            .with_api_base_url("https://ghe.example.org/api/v3/")
            .with_timeout(Duration::from_secs(60));
        let ctx = FetchContext::new(settings).unwrap();

        assert_eq!(ctx.settings.timeout, Duration::from_secs(60));
        assert_eq!(ctx.github.api_base(), "https://ghe.example.org/api/v3");
    }
}
