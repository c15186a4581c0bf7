//! Integration tests for core snapshot and view types.

use toolbox_core::{InstalledTool, ReleaseRecord, ReleaseSnapshot, ToolRepository, ToolboxView};

#[test]
fn test_tracked_snapshot_builds_full_view() {
    let records: Vec<ReleaseRecord> = ToolRepository::tracked()
        .into_iter()
        .map(ReleaseRecord::unknown)
        .collect();
    let snapshot = ReleaseSnapshot::new(records);

    let view = ToolboxView::build(&snapshot, &[], false);
    assert_eq!(view.tools.len(), snapshot.len());
    assert_eq!(view.installed_count(), 0);
}

#[test]
fn test_snapshot_json_roundtrip_then_merge() {
    let snapshot = ReleaseSnapshot::new(vec![ReleaseRecord {
        name: "Whitespace Remover".to_string(),
        version: "1.0.2".to_string(),
        ..ReleaseRecord::unknown(ToolRepository::parse("dhis2/tool-whitespace-remover").unwrap())
    }]);
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: ReleaseSnapshot = serde_json::from_str(&json).unwrap();

    let view = ToolboxView::build(&parsed, &[InstalledTool::new("whitespace remover", "1.0.1")], true);
    assert!(view.tools[0].is_outdated());
}
