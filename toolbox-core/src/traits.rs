//! Trait definitions for the toolbox.
//!
//! These are the seams between the sync logic and its collaborators: the
//! upstream release API, the host environment and the presentation layer.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::{Credential, InstalledTool, Notice, PromptReason, ReleaseSnapshot, ToolRepository, ToolboxView};

/// Source of latest-release data for a set of repositories.
///
/// Implementors must return exactly one record per input repository, in
/// input order. Per-repository failures are folded into `UNKNOWN` sentinel
/// fields instead of being returned as errors.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the latest release of every repository.
    async fn fetch_all(
        &self,
        repositories: &[ToolRepository],
        credential: &Credential,
    ) -> ReleaseSnapshot;
}

/// Point-in-time check of an upstream credential.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Returns true if the upstream currently accepts the credential.
    ///
    /// Transport failures and non-success responses report `false`.
    async fn is_valid(&self, credential: &Credential) -> bool;
}

/// Read-only listing of tools installed in the host environment.
#[async_trait]
pub trait InstalledToolsProvider: Send + Sync {
    /// Lists installed tools.
    async fn installed_tools(&self) -> Result<Vec<InstalledTool>, CoreError>;
}

/// Presentation collaborator fed by the sync logic.
pub trait Presenter: Send + Sync {
    /// Renders the merged tool list.
    fn render(&self, view: &ToolboxView);

    /// Shows the credential-entry prompt.
    fn prompt_credential(&self, reason: PromptReason);

    /// Shows a transient notification.
    fn notify(&self, notice: &Notice);
}

/// Installed-tools provider backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticInstalledTools(pub Vec<InstalledTool>);

#[async_trait]
impl InstalledToolsProvider for StaticInstalledTools {
    async fn installed_tools(&self) -> Result<Vec<InstalledTool>, CoreError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_installed_tools() {
        let provider = StaticInstalledTools(vec![InstalledTool::new("Option Sorter", "1.0")]);
        let tools = provider.installed_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].version, "1.0");
    }
}
