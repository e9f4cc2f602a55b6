//! # Store Errors
//!
//! Failures reported by the record and blob collaborators.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store / blob store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // Record errors
    #[error("Row not found: {0}")]
    RowNotFound(String),

    // Object errors
    #[error("The resource already exists: {0}")]
    ObjectAlreadyExists(String),

    /// The remote service rejected the call; message is passed through as-is
    #[error("{0}")]
    Backend(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed store response: {0}")]
    Decode(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Get HTTP status code
    ///
    /// Store failures are reported to callers as client errors carrying the
    /// underlying message; only a vanished row maps to 404.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::RowNotFound(_) => 404,
            StoreError::ObjectAlreadyExists(_) => 400,
            StoreError::Backend(_) => 400,
            StoreError::Transport(_) => 400,
            StoreError::Decode(_) => 400,
            StoreError::Internal(_) => 400,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}
