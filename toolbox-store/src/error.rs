//! Store and sync error types.

use thiserror::Error;
use toolbox_fetch::{FetchError, KeychainError};

/// Errors that can occur in the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry already exists; use update or replace instead.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Value rejected before it reached the backend.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Keychain error.
    #[error("Keychain error: {0}")]
    Keychain(#[from] KeychainError),

    /// Remote store error.
    #[error("Remote store error: {0}")]
    Remote(#[from] FetchError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the entry was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Errors surfaced by the sync session.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Operation needs a rendered session.
    #[error("Session is not ready; activate it with a valid credential first")]
    NotReady,

    /// Credential store failure.
    #[error("Credential store error: {0}")]
    Credential(#[from] StoreError),

    /// Other error.
    #[error("{0}")]
    Other(String),
}
