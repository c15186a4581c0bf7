//! Serde tests for core types.
//!
//! The snapshot JSON shape is shared with other readers of the cache, so the
//! field names are pinned here.

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::{
    InstallStatus, InstalledTool, Notice, NoticeLevel, ReleaseRecord, ReleaseSnapshot,
    ToolRepository, UNKNOWN,
};

fn sample_record() -> ReleaseRecord {
    ReleaseRecord {
        repo: ToolRepository::parse("dhis2/tool-option-sorter").unwrap(),
        name: "Option Sorter".to_string(),
        version: "1.4.0".to_string(),
        published_at: "2024-05-02T08:30:00Z".to_string(),
        download_url: "https://github.com/dhis2/tool-option-sorter/releases/download/v1.4.0/app.zip"
            .to_string(),
    }
}

// ============================================================================
// Release Serde Tests
// ============================================================================

#[test]
fn test_release_record_field_names() {
    let value = serde_json::to_value(sample_record()).unwrap();
    assert_eq!(value["repo"], "dhis2/tool-option-sorter");
    assert_eq!(value["name"], "Option Sorter");
    assert_eq!(value["version"], "1.4.0");
    assert_eq!(value["published_at"], "2024-05-02T08:30:00Z");
    assert!(value["download_url"].as_str().unwrap().ends_with("app.zip"));
}

#[test]
fn test_snapshot_roundtrip_preserves_sentinels() {
    let unknown = ReleaseRecord::unknown(ToolRepository::parse("dhis2/tool-prv-validator").unwrap());
    let fetched_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let snapshot = ReleaseSnapshot::with_fetched_at(vec![sample_record(), unknown], fetched_at);

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: ReleaseSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, snapshot);
    assert_eq!(parsed.releases[1].published_at, UNKNOWN);
    assert_eq!(parsed.releases[1].download_url, UNKNOWN);
}

#[test]
fn test_snapshot_rejects_malformed_repository() {
    let value = json!({
        "fetched_at": "2024-06-01T12:00:00Z",
        "releases": [{
            "repo": "not-a-repo",
            "name": "x",
            "version": "1",
            "published_at": "unknown",
            "download_url": "unknown"
        }]
    });
    assert!(serde_json::from_value::<ReleaseSnapshot>(value).is_err());
}

// ============================================================================
// Host Type Serde Tests
// ============================================================================

#[test]
fn test_installed_tool_ignores_extra_host_fields() {
    let value = json!({
        "key": "dashboard-pruner",
        "name": "Dashboard Pruner",
        "version": "0.3.1",
        "appType": "APP",
        "launchUrl": "https://play.dhis2.org/api/apps/dashboard-pruner/index.html"
    });
    let tool: InstalledTool = serde_json::from_value(value).unwrap();
    assert_eq!(tool.name, "Dashboard Pruner");
    assert_eq!(tool.key.as_deref(), Some("dashboard-pruner"));
}

#[test]
fn test_install_status_tagging() {
    let installed = serde_json::to_value(InstallStatus::Installed {
        version: "2.1".to_string(),
    })
    .unwrap();
    assert_eq!(installed, json!({"status": "installed", "version": "2.1"}));

    let missing = serde_json::to_value(InstallStatus::NotInstalled).unwrap();
    assert_eq!(missing, json!({"status": "not_installed"}));
}

#[test]
fn test_notice_level_lowercase() {
    let notice = Notice::warning("cache write failed");
    let value = serde_json::to_value(&notice).unwrap();
    assert_eq!(value["level"], "warning");
    assert_eq!(notice.level, NoticeLevel::Warning);
}
