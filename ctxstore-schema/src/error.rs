//! Error types for descriptors and validation.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// A value that does not conform to a slot schema.
///
/// `path` is a JSON-pointer-like location inside the rejected value; `/` is
/// the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at {path})")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by descriptors and the key registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A value failed validation for the given key.
    #[error("invalid value for '{key}': {source}")]
    Validation {
        key: String,
        #[source]
        source: ValidationError,
    },

    /// A descriptor's own default does not satisfy its schema.
    #[error("default value for '{key}' does not match its schema: {source}")]
    InvalidDefault {
        key: String,
        #[source]
        source: ValidationError,
    },

    /// Two descriptors registered under the same key.
    #[error("key already registered: {0}")]
    DuplicateKey(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
