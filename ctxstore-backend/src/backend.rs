//! Backend abstraction.

use crate::error::BackendResult;
use async_trait::async_trait;
use ctxstore_types::StorageChange;
use serde_json::Value;
use tokio::sync::broadcast;

/// Buffered raw changes per feed subscriber before it starts lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Receiving end of a backend's raw change feed.
pub type ChangeFeed = broadcast::Receiver<StorageChange>;

/// A durable key-value service, atomic per key.
///
/// Implementations emit exactly one [`StorageChange`] per mutation that
/// actually changes a slot. Writing the value a slot already holds, or
/// removing an absent key, emits nothing.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Reads a slot. `None` when the slot is empty.
    async fn get(&self, key: &str) -> BackendResult<Option<Value>>;

    /// Writes a slot.
    async fn set(&self, key: &str, value: Value) -> BackendResult<()>;

    /// Empties a slot.
    async fn remove(&self, key: &str) -> BackendResult<()>;

    /// Subscribes to the raw change feed.
    fn subscribe(&self) -> ChangeFeed;
}
