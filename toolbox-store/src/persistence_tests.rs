//! Persistence and settings round-trip tests.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, save_json};
use crate::settings_store::{
    CacheSettings, InstalledToolsSource, LogLevel, Settings, SettingsStore,
};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let mut settings = Settings::default();
    settings.log_level = LogLevel::Debug;
    settings.installed_tools = InstalledToolsSource::File {
        path: PathBuf::from("/tmp/apps.json"),
    };

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();
    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");
    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ensure_dir_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let new_dir = temp_dir.path().join("new_directory");

    ensure_dir(&new_dir).await.unwrap();
    assert!(new_dir.is_dir());

    // Idempotent
    ensure_dir(&new_dir).await.unwrap();
}

// ============================================================================
// Settings Tests
// ============================================================================

#[tokio::test]
async fn test_settings_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::load(temp_dir.path().join("settings.json"))
        .await
        .unwrap();
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_settings_invalid_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let store = SettingsStore::load(path).await.unwrap();
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_settings_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(
        &path,
        r#"{"cache": {"backend": "dhis2"}, "dhis2": {"base_url": "https://dhis2.example.org"}}"#,
    )
    .await
    .unwrap();

    let settings = SettingsStore::load(path).await.unwrap().get().await;
    assert_eq!(settings.cache, CacheSettings::Dhis2);
    assert_eq!(settings.dhis2.base_url.as_deref(), Some("https://dhis2.example.org"));
    assert_eq!(settings.dhis2.password_env, "DHIS2_PASSWORD");
    assert_eq!(settings.github.request_timeout_secs, 15);
    assert_eq!(settings.installed_tools, InstalledToolsSource::None);
}

#[tokio::test]
async fn test_settings_update_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    let store = SettingsStore::load(path.clone()).await.unwrap();
    store
        .update(|s| s.github.api_base_url = "https://ghe.example.org/api/v3".to_string())
        .await;
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(path).await.unwrap().get().await;
    assert_eq!(reloaded.github.api_base_url, "https://ghe.example.org/api/v3");
}

#[test]
fn test_request_timeout_is_never_zero() {
    let mut settings = Settings::default();
    settings.github.request_timeout_secs = 0;
    assert_eq!(settings.github.request_timeout().as_secs(), 1);
}
