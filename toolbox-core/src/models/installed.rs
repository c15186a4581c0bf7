//! Tools installed in the host environment.

use serde::{Deserialize, Serialize};

/// A tool currently installed in the host, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledTool {
    /// Display name of the installed app.
    pub name: String,
    /// Installed version string.
    pub version: String,
    /// Host-side app key, when the host reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl InstalledTool {
    /// Creates an installed tool entry without a host key.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            key: None,
        }
    }

    /// Case-insensitive name comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
