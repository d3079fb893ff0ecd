//! Canonical store adapter for ctxstore.
//!
//! The privileged context is the only place with direct access to durable
//! storage. This crate defines that access:
//!
//! - [`KeyValueBackend`]: the external key-value service (get/set/remove plus
//!   a best-effort raw change feed)
//! - [`MemoryBackend`] and [`JsonFileBackend`]: the two shipped backends
//! - [`StoreAdapter`]: the single owner of ground truth that the RPC
//!   handlers and the change broadcaster sit on
//!
//! Backend errors are never swallowed here; they travel back to whichever
//! context issued the request.

mod adapter;
mod backend;
mod error;
mod file;
mod memory;
pub mod mock;

pub use adapter::StoreAdapter;
pub use backend::{ChangeFeed, KeyValueBackend, DEFAULT_FEED_CAPACITY};
pub use error::{BackendError, BackendResult};
pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
