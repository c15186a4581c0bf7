//! Per-user credential storage.
//!
//! A single GitHub access token kept in the user's keychain.
//!
//! ## Usage
//!
//! ```ignore
//! use toolbox_store::CredentialStore;
//!
//! let store = CredentialStore::new(Arc::new(SystemKeychain::new()));
//!
//! // First entry or replacement, whichever applies
//! store.upsert(&Credential::new("ghp_xxxxx")).await?;
//!
//! if let Some(credential) = store.get().await? {
//!     println!("Key is configured!");
//! }
//! ```

use std::sync::Arc;

use toolbox_core::Credential;
use toolbox_fetch::{KeychainApi, KeychainError};
use tracing::{debug, info};

use crate::error::StoreError;

/// Keychain service namespace for toolbox entries.
pub const NAMESPACE: &str = "dhis2-toolbox";

/// Keychain account holding the GitHub access token.
pub const CREDENTIAL_KEY: &str = "github-key";

/// Credential store over a keychain.
#[derive(Clone)]
pub struct CredentialStore {
    keychain: Arc<dyn KeychainApi>,
    namespace: String,
    key: String,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store at the default namespace and key.
    pub fn new(keychain: Arc<dyn KeychainApi>) -> Self {
        Self::with_location(keychain, NAMESPACE, CREDENTIAL_KEY)
    }

    /// Creates a store at a custom namespace and key.
    pub fn with_location(
        keychain: Arc<dyn KeychainApi>,
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            keychain,
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    fn location(&self) -> String {
        format!("{}/{}", self.namespace, self.key)
    }

    fn reject_empty(credential: &Credential) -> Result<(), StoreError> {
        if credential.is_empty() {
            Err(StoreError::InvalidValue("credential is empty".to_string()))
        } else {
            Ok(())
        }
    }

    /// Reads the stored credential. No entry yet is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keychain cannot be accessed.
    pub async fn get(&self) -> Result<Option<Credential>, StoreError> {
        let secret = self.keychain.get(&self.namespace, &self.key).await?;
        Ok(secret.map(Credential::new).filter(|c| !c.is_empty()))
    }

    /// Returns true if a credential is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the keychain cannot be accessed.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.get().await?.is_some())
    }

    /// Stores the first credential.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if one is already stored.
    pub async fn create(&self, credential: &Credential) -> Result<(), StoreError> {
        Self::reject_empty(credential)?;
        if self.exists().await? {
            return Err(StoreError::AlreadyExists(self.location()));
        }
        self.keychain
            .set(&self.namespace, &self.key, credential.expose())
            .await?;
        info!(namespace = %self.namespace, key = %self.key, "Credential created");
        Ok(())
    }

    /// Replaces the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if nothing is stored yet.
    pub async fn update(&self, credential: &Credential) -> Result<(), StoreError> {
        Self::reject_empty(credential)?;
        if !self.exists().await? {
            return Err(StoreError::NotFound(self.location()));
        }
        self.keychain
            .set(&self.namespace, &self.key, credential.expose())
            .await?;
        info!(namespace = %self.namespace, key = %self.key, "Credential updated");
        Ok(())
    }

    /// Creates or updates, whichever applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the keychain cannot be accessed.
    pub async fn upsert(&self, credential: &Credential) -> Result<(), StoreError> {
        if self.exists().await? {
            debug!("Credential present, updating");
            self.update(credential).await
        } else {
            debug!("No credential yet, creating");
            self.create(credential).await
        }
    }

    /// Removes the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if nothing was stored.
    pub async fn delete(&self) -> Result<(), StoreError> {
        match self.keychain.delete(&self.namespace, &self.key).await {
            Ok(()) => {
                info!(namespace = %self.namespace, key = %self.key, "Credential deleted");
                Ok(())
            }
            Err(KeychainError::NotFound { .. }) => Err(StoreError::NotFound(self.location())),
            Err(e) => Err(e.into()),
        }
    }
}
