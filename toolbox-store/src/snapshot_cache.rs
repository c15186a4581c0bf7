//! Shared release cache.
//!
//! Holds the last fetched [`ReleaseSnapshot`] in a [`DataStore`] so later
//! activations can skip the upstream round-trip. There is no
//! compare-and-swap: concurrent writers race and the last one wins.

use std::sync::Arc;

use toolbox_core::ReleaseSnapshot;
use tracing::{debug, info, warn};

use crate::credential_store::NAMESPACE;
use crate::data_store::DataStore;
use crate::error::StoreError;

/// Key of the shared snapshot entry.
pub const SNAPSHOT_KEY: &str = "latest_releases";

/// Cache of the latest release snapshot.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn DataStore>,
    namespace: String,
    key: String,
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SnapshotCache {
    /// Creates a cache at the default namespace and key.
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            namespace: NAMESPACE.to_string(),
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Reads the cached snapshot.
    ///
    /// An entry that no longer parses as a snapshot counts as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub async fn read(&self) -> Result<Option<ReleaseSnapshot>, StoreError> {
        let Some(value) = self.store.get(&self.namespace, &self.key).await? else {
            debug!("No cached snapshot");
            return Ok(None);
        };

        match serde_json::from_value::<ReleaseSnapshot>(value) {
            Ok(snapshot) => {
                debug!(fetched_at = %snapshot.fetched_at, count = snapshot.len(), "Cached snapshot loaded");
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "Cached snapshot is unreadable, ignoring it");
                Ok(None)
            }
        }
    }

    /// Replaces the cached snapshot wholesale.
    ///
    /// Deletes the old entry first. A failed delete, including "nothing to
    /// delete", is logged and the write goes ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the new entry cannot be created.
    pub async fn replace(&self, snapshot: &ReleaseSnapshot) -> Result<(), StoreError> {
        match self.store.delete(&self.namespace, &self.key).await {
            Ok(()) => debug!("Previous snapshot deleted"),
            Err(e) if e.is_not_found() => debug!("No previous snapshot to delete"),
            Err(e) => warn!(error = %e, "Failed to delete previous snapshot"),
        }

        let value = serde_json::to_value(snapshot)?;
        self.store.create(&self.namespace, &self.key, &value).await?;

        info!(fetched_at = %snapshot.fetched_at, count = snapshot.len(), "Snapshot cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use toolbox_core::{ReleaseRecord, ToolRepository};

    use super::*;
    use crate::data_store::MemoryDataStore;

    fn snapshot() -> ReleaseSnapshot {
        let repo = ToolRepository::parse("dhis2/tool-option-sorter").unwrap();
        ReleaseSnapshot::new(vec![ReleaseRecord {
            name: "Option Sorter".to_string(),
            ..ReleaseRecord::unknown(repo)
        }])
    }

    #[tokio::test]
    async fn test_replace_then_read_on_empty_store() {
        let cache = SnapshotCache::new(Arc::new(MemoryDataStore::new()));
        let s = snapshot();
        cache.replace(&s).await.unwrap();
        assert_eq!(cache.read().await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn test_replace_overwrites() {
        let cache = SnapshotCache::new(Arc::new(MemoryDataStore::new()));
        cache.replace(&snapshot()).await.unwrap();

        let newer = ReleaseSnapshot::new(vec![]);
        cache.replace(&newer).await.unwrap();
        assert_eq!(cache.read().await.unwrap(), Some(newer));
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_absent() {
        let store = Arc::new(MemoryDataStore::new());
        store
            .create(NAMESPACE, SNAPSHOT_KEY, &json!({"garbage": true}))
            .await
            .unwrap();

        let cache = SnapshotCache::new(store);
        assert_eq!(cache.read().await.unwrap(), None);
    }

    /// Store whose deletes always fail with a backend error.
    struct StuckDelete(MemoryDataStore);

    #[async_trait]
    impl DataStore for StuckDelete {
        async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
            self.0.get(namespace, key).await
        }

        async fn create(&self, namespace: &str, key: &str, value: &Value) -> Result<(), StoreError> {
            self.0.create(namespace, key, value).await
        }

        async fn delete(&self, _namespace: &str, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Config("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let cache = SnapshotCache::new(Arc::new(StuckDelete(MemoryDataStore::new())));
        let s = snapshot();
        cache.replace(&s).await.unwrap();
        assert_eq!(cache.read().await.unwrap(), Some(s));
    }
}
