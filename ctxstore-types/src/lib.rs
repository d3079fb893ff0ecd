//! Core type definitions for ctxstore.
//!
//! This crate defines the small set of types every context agrees on:
//! - Context identifiers (UUID v7) and context kinds
//! - Raw storage change events emitted by the privileged backend
//!
//! Anything specific to a single slot (themes, prompts, ...) lives in
//! `ctxstore-schema`, not here.

mod change;
mod context;

pub use change::StorageChange;
pub use context::{ContextId, ContextKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid context id: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown context kind: {0}")]
    UnknownContextKind(String),
}
