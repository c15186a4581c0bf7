//! Installed-tools listing read from a JSON file.

use std::path::PathBuf;

use async_trait::async_trait;
use toolbox_core::{CoreError, InstalledTool, InstalledToolsProvider};
use tracing::debug;

/// Reads a JSON array of `{name, version}` objects on every call.
#[derive(Debug, Clone)]
pub struct JsonFileInstalledTools {
    path: PathBuf,
}

impl JsonFileInstalledTools {
    /// Creates a provider for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InstalledToolsProvider for JsonFileInstalledTools {
    async fn installed_tools(&self) -> Result<Vec<InstalledTool>, CoreError> {
        debug!(path = %self.path.display(), "Reading installed tools");
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::Unavailable(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        tokio::fs::write(
            &path,
            r#"[{"name": "Option Sorter", "version": "1.3.0", "key": "option-sorter", "appType": "APP"}]"#,
        )
        .await
        .unwrap();

        let tools = JsonFileInstalledTools::new(&path).installed_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "Option Sorter");
        assert_eq!(tools[0].key.as_deref(), Some("option-sorter"));
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let provider = JsonFileInstalledTools::new("/nonexistent/apps.json");
        assert!(matches!(
            provider.installed_tools().await,
            Err(CoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        tokio::fs::write(&path, "{}").await.unwrap();

        assert!(JsonFileInstalledTools::new(&path).installed_tools().await.is_err());
    }
}
