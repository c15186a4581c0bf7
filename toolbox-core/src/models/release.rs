//! Release-related types.
//!
//! - [`ReleaseRecord`] - Latest release of one tracked repository
//! - [`ReleaseSnapshot`] - All records from one fetch cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::ToolRepository;

/// Placeholder used instead of absence when upstream data is unobtainable.
pub const UNKNOWN: &str = "unknown";

// ============================================================================
// Release Record
// ============================================================================

/// The latest published release of a single tool repository.
///
/// Every field is always populated; missing upstream data is stored as
/// [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Source repository.
    pub repo: ToolRepository,
    /// Tool display name (from the repository manifest).
    pub name: String,
    /// Tool version string (from the repository manifest).
    pub version: String,
    /// ISO-8601 publish time of the latest release, or [`UNKNOWN`].
    pub published_at: String,
    /// Download URL of the first release asset, or [`UNKNOWN`].
    pub download_url: String,
}

impl ReleaseRecord {
    /// Creates a record with every upstream field set to [`UNKNOWN`].
    pub fn unknown(repo: ToolRepository) -> Self {
        Self {
            repo,
            name: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            published_at: UNKNOWN.to_string(),
            download_url: UNKNOWN.to_string(),
        }
    }

    /// Parses the publish time, if it is a real timestamp.
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Returns true if a downloadable asset is known.
    pub fn has_download(&self) -> bool {
        self.download_url != UNKNOWN
    }
}

// ============================================================================
// Release Snapshot
// ============================================================================

/// The full set of latest release records as of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSnapshot {
    /// When the records were fetched.
    pub fetched_at: DateTime<Utc>,
    /// One record per tracked repository.
    pub releases: Vec<ReleaseRecord>,
}

impl ReleaseSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(releases: Vec<ReleaseRecord>) -> Self {
        Self::with_fetched_at(releases, Utc::now())
    }

    /// Creates a snapshot with an explicit fetch time.
    pub fn with_fetched_at(releases: Vec<ReleaseRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            releases,
        }
    }

    /// Sorts records by name, case-insensitively. Ties keep their order.
    pub fn sort_by_name(&mut self) {
        sort_by_name(&mut self.releases, |r| &r.name);
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Returns true if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Looks up the record for a repository.
    pub fn get(&self, repo: &ToolRepository) -> Option<&ReleaseRecord> {
        self.releases.iter().find(|r| &r.repo == repo)
    }
}

/// Stable, case-insensitive ascending sort on a name key.
pub(crate) fn sort_by_name<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| name(item).to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(repo: &str, name: &str) -> ReleaseRecord {
        ReleaseRecord {
            name: name.to_string(),
            ..ReleaseRecord::unknown(ToolRepository::parse(repo).unwrap())
        }
    }

    #[test]
    fn test_unknown_record_has_sentinels() {
        let r = ReleaseRecord::unknown(ToolRepository::parse("a/b").unwrap());
        assert_eq!(r.name, UNKNOWN);
        assert_eq!(r.published_at, UNKNOWN);
        assert!(!r.has_download());
        assert!(r.published_date().is_none());
    }

    #[test]
    fn test_published_date_parses_iso() {
        let mut r = record("a/b", "B");
        r.published_at = "2024-03-01T10:00:00Z".to_string();
        let date = r.published_date().unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let mut snapshot = ReleaseSnapshot::new(vec![
            record("o/1", "beta"),
            record("o/2", "Alpha"),
            record("o/3", "BETA"),
            record("o/4", "alpha"),
        ]);
        snapshot.sort_by_name();

        let repos: Vec<&str> = snapshot.releases.iter().map(|r| r.repo.as_str()).collect();
        assert_eq!(repos, vec!["o/2", "o/4", "o/1", "o/3"]);
    }
}
