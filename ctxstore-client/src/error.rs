//! Error types for storage handles and context runtimes.

use ctxstore_rpc::RpcError;
use ctxstore_schema::SchemaError;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by [`StorageHandle`](crate::StorageHandle) and the
/// context runtimes.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The request could not be delivered, or the privileged side rejected it.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The value does not satisfy the slot's schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The stored value does not decode into the slot's type.
    #[error("stored value for '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be encoded as JSON.
    #[error("value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A client context was asked to connect with a privileged kind.
    #[error("client contexts cannot be privileged")]
    PrivilegedClient,
}

impl StorageError {
    /// Whether the failure is "no handler reachable" rather than a rejection.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Rpc(e) if e.is_unreachable())
    }
}
