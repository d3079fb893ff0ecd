//! Error types for the backend layer.

use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur in backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data is not in the expected shape.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The backend refused or could not serve the call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
