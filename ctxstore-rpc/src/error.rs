//! Error types for the RPC layer.

use thiserror::Error;

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Errors that can occur on request/response calls.
#[derive(Debug, Error)]
pub enum RpcError {
    /// No handler for the message could be reached.
    #[error("could not reach a '{name}' handler: receiving end does not exist")]
    Unreachable { name: String },

    /// The remote handler ran and failed. `message` is its error, verbatim.
    #[error("'{name}' handler failed: {message}")]
    Handler { name: String, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A second handler was registered for the same message name.
    #[error("a handler for '{0}' is already registered")]
    DuplicateHandler(String),

    /// A privileged context tried to connect while another one is live.
    #[error("a privileged context is already connected")]
    PrivilegedContextTaken,

    /// The local port was closed.
    #[error("channel closed")]
    ChannelClosed,
}

impl RpcError {
    /// Whether this is a "no receiver" condition rather than a real failure.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Outcome of a notification send that did not succeed.
///
/// `Unreachable` is expected (the receiving context is gone) and is never
/// surfaced as an error by callers; the other variants are genuine failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No receiver: the context closed or registered no handler.
    #[error("no receiver for notification")]
    Unreachable,

    /// The receiving handler ran and failed.
    #[error("notification handler failed: {0}")]
    Handler(String),

    /// The payload could not be encoded.
    #[error("could not encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

impl NotifyError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}
