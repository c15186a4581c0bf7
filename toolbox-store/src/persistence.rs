//! On-disk locations and JSON files.
//!
//! Everything the toolbox writes is JSON, written atomically and readable
//! by the owning user only.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

#[cfg(target_os = "macos")]
const APP_DIR: &str = "DHIS2 Toolbox";
#[cfg(not(target_os = "macos"))]
const APP_DIR: &str = "toolbox";

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.map_or_else(|| PathBuf::from("."), |b| b.join(APP_DIR))
}

/// Platform configuration directory, e.g. `~/.config/toolbox`.
pub fn default_config_dir() -> PathBuf {
    app_dir(dirs::config_dir())
}

/// Settings file inside [`default_config_dir`].
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Root of the file-backed data store, e.g. `~/.cache/toolbox/datastore`.
pub fn default_data_store_dir() -> PathBuf {
    app_dir(dirs::cache_dir()).join("datastore")
}

#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    debug!(path = %path.display(), mode = %format_args!("{mode:o}"), "Permissions restricted");
    Ok(())
}

#[cfg(not(unix))]
async fn restrict(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Writes `data` as pretty JSON through a temp file and rename, mode 0600.
///
/// Missing parent directories are created with mode 0700.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    restrict(path, 0o600).await?;

    debug!(path = %path.display(), bytes = json.len(), "JSON saved");
    Ok(())
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), "JSON read");
    Ok(serde_json::from_str(&content)?)
}

/// Creates `path` (and parents) with mode 0700 unless it already exists.
pub(crate) async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    restrict(path, 0o700).await
}
