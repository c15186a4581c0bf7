//! User-scoped secret storage.
//!
//! This module provides access to the system's secure credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//!
//! Entries are addressed by `service` (the toolbox namespace) and `account`
//! (the logical key). [`MemoryKeychain`] keeps entries in process memory for
//! tests and ephemeral sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use keyring::Entry;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::KeychainError;

// ============================================================================
// Keychain API Trait
// ============================================================================

/// API for user-scoped secret storage.
#[async_trait]
pub trait KeychainApi: Send + Sync {
    /// Get a secret.
    ///
    /// # Returns
    /// * `Ok(Some(secret))` - Secret found
    /// * `Ok(None)` - No entry (empty secrets count as no entry)
    /// * `Err(e)` - Error accessing the store
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;

    /// Store a secret, overwriting any existing one.
    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Delete a secret.
    ///
    /// Returns `KeychainError::NotFound` if there was nothing to delete.
    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;
}

// ============================================================================
// System Keychain Implementation
// ============================================================================

/// Default implementation using the system keychain via `keyring`.
#[derive(Debug, Clone, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates a new system keychain instance.
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(service, account).map_err(|e| KeychainError::Platform(e.to_string()))
    }

    fn not_found(service: &str, account: &str) -> KeychainError {
        KeychainError::NotFound {
            service: service.to_string(),
            account: account.to_string(),
        }
    }
}

#[async_trait]
impl KeychainApi for SystemKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        debug!(service = %service, account = %account, "Getting secret from keychain");

        let entry = Self::entry(service, account)?;

        match entry.get_password() {
            Ok(secret) if !secret.is_empty() => {
                debug!(service = %service, account = %account, "Secret found");
                Ok(Some(secret))
            }
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(service = %service, account = %account, "Secret not found");
                Ok(None)
            }
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to get secret");
                Err(e.into())
            }
        }
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Setting secret in keychain");

        let entry = Self::entry(service, account)?;

        entry.set_password(secret).map_err(|e| {
            warn!(service = %service, account = %account, error = %e, "Failed to set secret");
            KeychainError::from(e)
        })?;

        debug!(service = %service, account = %account, "Secret stored");
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        debug!(service = %service, account = %account, "Deleting secret from keychain");

        let entry = Self::entry(service, account)?;

        match entry.delete_credential() {
            Ok(()) => {
                debug!(service = %service, account = %account, "Secret deleted");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Err(Self::not_found(service, account)),
            Err(e) => {
                warn!(service = %service, account = %account, error = %e, "Failed to delete secret");
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// In-Memory Implementation
// ============================================================================

/// Keychain held in process memory.
#[derive(Debug, Default)]
pub struct MemoryKeychain {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryKeychain {
    /// Creates an empty in-memory keychain.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(service: &str, account: &str) -> (String, String) {
        (service.to_string(), account.to_string())
    }
}

#[async_trait]
impl KeychainApi for MemoryKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(&Self::key(service, account))
            .filter(|s| !s.is_empty())
            .cloned())
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        self.entries
            .lock()
            .await
            .insert(Self::key(service, account), secret.to_string());
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        match self.entries.lock().await.remove(&Self::key(service, account)) {
            Some(_) => Ok(()),
            None => Err(SystemKeychain::not_found(service, account)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
