//! Tracked tool repositories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Repositories whose releases the toolbox tracks.
pub const TRACKED_REPOSITORIES: &[&str] = &[
    "dhis2/tool-dashboard-pruner",
    "dhis2/tool-translation-deduplicator",
    "dhis2/tool-prv-validator",
    "dhis2/tool-whitespace-remover",
    "dhis2/user-role-aggregator",
    "dhis2/tool-option-sorter",
    "dhis2/tool-category-dimension-disabler",
    "dhis2/tool-deprecated-authorities",
];

/// A source repository identifier (`owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolRepository(String);

impl ToolRepository {
    /// Parses an `owner/name` identifier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRepository` unless the identifier has
    /// exactly one `/` separating two non-empty parts.
    pub fn parse(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        match id.split_once('/') {
            Some((owner, name))
                if !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/')
                    && !id.contains(char::is_whitespace) =>
            {
                Ok(Self(id))
            }
            _ => Err(CoreError::InvalidRepository(id)),
        }
    }

    /// Returns the compiled-in list of tracked repositories.
    pub fn tracked() -> Vec<Self> {
        TRACKED_REPOSITORIES
            .iter()
            .map(|id| Self((*id).to_string()))
            .collect()
    }

    /// Returns the full `owner/name` identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owner part.
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// Returns the repository name part.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, name)| name)
    }

    /// Browser URL of the repository.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}", self.0)
    }
}

impl fmt::Display for ToolRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ToolRepository {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ToolRepository> for String {
    fn from(repo: ToolRepository) -> Self {
        repo.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let repo = ToolRepository::parse("dhis2/tool-option-sorter").unwrap();
        assert_eq!(repo.owner(), "dhis2");
        assert_eq!(repo.name(), "tool-option-sorter");
        assert_eq!(repo.html_url(), "https://github.com/dhis2/tool-option-sorter");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "dhis2", "/name", "owner/", "a/b/c", "own er/name"] {
            assert!(ToolRepository::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_tracked_list_is_valid() {
        let tracked = ToolRepository::tracked();
        assert_eq!(tracked.len(), TRACKED_REPOSITORIES.len());
        for repo in &tracked {
            assert!(ToolRepository::parse(repo.as_str()).is_ok());
        }
    }
}
