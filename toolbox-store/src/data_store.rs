//! Namespace-scoped key/value stores.
//!
//! Entries are JSON values addressed by `(namespace, key)`. There is no
//! update-in-place: callers delete and create.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use toolbox_fetch::{Dhis2Client, FetchError};
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_data_store_dir, load_json, save_json};

// ============================================================================
// Data Store Trait
// ============================================================================

/// A shared key/value store.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Reads an entry. A missing entry is `Ok(None)`.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Creates an entry.
    ///
    /// Returns `StoreError::AlreadyExists` if the key is taken.
    async fn create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Deletes an entry.
    ///
    /// Returns `StoreError::NotFound` if there was nothing to delete.
    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError>;
}

fn entry_name(namespace: &str, key: &str) -> String {
    format!("{namespace}/{key}")
}

// ============================================================================
// File Backend
// ============================================================================

/// One JSON file per entry under `<root>/<namespace>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileDataStore {
    root: PathBuf,
}

impl FileDataStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store at the default cache location.
    pub fn at_default_location() -> Self {
        Self::new(default_data_store_dir())
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, namespace: &str, key: &str) -> Result<PathBuf, StoreError> {
        for part in [namespace, key] {
            if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
                return Err(StoreError::InvalidValue(format!("bad path segment: {part:?}")));
            }
        }
        Ok(self.root.join(namespace).join(format!("{key}.json")))
    }
}

#[async_trait]
impl DataStore for FileDataStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.entry_path(namespace, key)?;
        if !tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "Entry not found");
            return Ok(None);
        }
        Ok(Some(load_json(&path).await?))
    }

    async fn create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists(entry_name(namespace, key)));
        }
        save_json(&path, value).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(namespace, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(entry_name(namespace, key)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-Memory Backend
// ============================================================================

/// Store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    entries: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryDataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(namespace: &str, key: &str) -> (String, String) {
        (namespace.to_string(), key.to_string())
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(&Self::slot(namespace, key)).cloned())
    }

    async fn create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let slot = Self::slot(namespace, key);
        if entries.contains_key(&slot) {
            return Err(StoreError::AlreadyExists(entry_name(namespace, key)));
        }
        entries.insert(slot, value.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        match self.entries.lock().await.remove(&Self::slot(namespace, key)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(entry_name(namespace, key))),
        }
    }
}

// ============================================================================
// DHIS2 Backend
// ============================================================================

/// The `dataStore` of a DHIS2 instance.
#[derive(Debug, Clone)]
pub struct Dhis2DataStore {
    client: Arc<Dhis2Client>,
}

impl Dhis2DataStore {
    /// Creates a store over a DHIS2 client.
    pub fn new(client: Arc<Dhis2Client>) -> Self {
        Self { client }
    }

    fn map_error(namespace: &str, key: &str, error: FetchError) -> StoreError {
        match error {
            FetchError::NotFound(_) => StoreError::NotFound(entry_name(namespace, key)),
            FetchError::Conflict(_) => StoreError::AlreadyExists(entry_name(namespace, key)),
            other => StoreError::Remote(other),
        }
    }
}

#[async_trait]
impl DataStore for Dhis2DataStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.client
            .data_store_get(namespace, key)
            .await
            .map_err(|e| Self::map_error(namespace, key, e))
    }

    async fn create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
        self.client
            .data_store_create(namespace, key, value)
            .await
            .map_err(|e| Self::map_error(namespace, key, e))
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.client
            .data_store_delete(namespace, key)
            .await
            .map_err(|e| Self::map_error(namespace, key, e))
    }
}

// ============================================================================
// Tests
// ============================================================================
