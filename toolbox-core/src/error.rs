//! Core error types for the toolbox.

use thiserror::Error;

/// Core error type for toolbox operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository identifier is not of the form `owner/name`.
    #[error("Invalid repository identifier: {0}")]
    InvalidRepository(String),

    /// A host collaborator could not be reached.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
