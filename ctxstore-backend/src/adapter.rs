use crate::backend::{ChangeFeed, KeyValueBackend};
use crate::error::BackendResult;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The privileged context's single interface to the backend.
///
/// Not `Clone`. The background context owns exactly one adapter and shares
/// it behind an `Arc`; every write in the system goes through it.
pub struct StoreAdapter {
    backend: Arc<dyn KeyValueBackend>,
}

impl StoreAdapter {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        debug!("adapter get {key}");
        self.backend.get(key).await.inspect_err(|e| {
            warn!("Backend {} failed to get '{key}': {e}", self.backend.name());
        })
    }

    pub async fn set(&self, key: &str, value: Value) -> BackendResult<()> {
        debug!("adapter set {key}");
        self.backend.set(key, value).await.inspect_err(|e| {
            warn!("Backend {} failed to set '{key}': {e}", self.backend.name());
        })
    }

    pub async fn remove(&self, key: &str) -> BackendResult<()> {
        debug!("adapter remove {key}");
        self.backend.remove(key).await.inspect_err(|e| {
            warn!("Backend {} failed to remove '{key}': {e}", self.backend.name());
        })
    }

    /// Subscribes to the backend's raw change feed.
    pub fn changes(&self) -> ChangeFeed {
        self.backend.subscribe()
    }
}
