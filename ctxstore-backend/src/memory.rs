use crate::backend::{ChangeFeed, KeyValueBackend, DEFAULT_FEED_CAPACITY};
use crate::error::BackendResult;
use async_trait::async_trait;
use ctxstore_types::StorageChange;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// In-memory backend. Contents are lost when it is dropped.
pub struct MemoryBackend {
    slots: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Creates a backend whose change feed buffers `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity);
        Self {
            slots: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Creates a backend pre-populated with `slots`. No changes are emitted.
    pub fn with_slots(slots: impl IntoIterator<Item = (String, Value)>) -> Self {
        let (changes, _) = broadcast::channel(DEFAULT_FEED_CAPACITY);
        Self {
            slots: RwLock::new(slots.into_iter().collect()),
            changes,
        }
    }

    /// Number of non-empty slots.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    fn emit(&self, change: StorageChange) {
        // No subscribers is fine: nobody is listening yet.
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> BackendResult<()> {
        let mut slots = self.slots.write().await;
        let old = slots.insert(key.to_string(), value.clone());
        if old.as_ref() != Some(&value) {
            self.emit(StorageChange::new(key, old, Some(value)));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        let mut slots = self.slots.write().await;
        if let Some(old) = slots.remove(key) {
            self.emit(StorageChange::new(key, Some(old), None));
        }
        Ok(())
    }

    fn subscribe(&self) -> ChangeFeed {
        self.changes.subscribe()
    }
}
