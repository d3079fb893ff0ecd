//! The privileged context runtime.

use crate::broadcaster::ChangeBroadcaster;
use crate::config::BackgroundConfig;
use crate::error::StorageResult;
use anyhow::anyhow;
use ctxstore_backend::{KeyValueBackend, StoreAdapter};
use ctxstore_rpc::{Hub, RpcChannel, StorageGet, StorageRemove, StorageSet};
use ctxstore_schema::KeyRegistry;
use ctxstore_types::{ContextId, ContextKind};
use std::sync::Arc;
use tracing::info;

/// Owns the canonical store and answers every storage request.
///
/// At most one can be connected to a hub at a time.
pub struct BackgroundContext {
    channel: RpcChannel,
    adapter: Arc<StoreAdapter>,
    registry: Arc<KeyRegistry>,
    broadcaster: ChangeBroadcaster,
}

impl BackgroundContext {
    /// Connects to `hub` as the privileged context, registers the storage
    /// handlers, and starts broadcasting backend changes.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(
        hub: &Hub,
        backend: Arc<dyn KeyValueBackend>,
        registry: KeyRegistry,
        config: BackgroundConfig,
    ) -> StorageResult<Self> {
        let channel = RpcChannel::new(Arc::new(hub.connect(ContextKind::Background)?));
        let adapter = Arc::new(StoreAdapter::new(backend));
        let registry = Arc::new(registry);

        // Subscribe before any handler can write.
        let broadcaster = ChangeBroadcaster::spawn(channel.clone(), adapter.changes());

        let store = adapter.clone();
        channel.on_request::<StorageGet, _, _>(move |req| {
            let store = store.clone();
            async move { Ok::<_, anyhow::Error>(store.get(&req.key).await?) }
        })?;

        let store = adapter.clone();
        let slots = registry.clone();
        let validate = config.validate_writes;
        channel.on_request::<StorageSet, _, _>(move |req| {
            let store = store.clone();
            let slots = slots.clone();
            async move {
                if validate {
                    slots.validate(&req.key, &req.value).map_err(|e| anyhow!("{e}"))?;
                }
                store.set(&req.key, req.value).await?;
                Ok::<_, anyhow::Error>(())
            }
        })?;

        let store = adapter.clone();
        channel.on_request::<StorageRemove, _, _>(move |req| {
            let store = store.clone();
            async move { Ok::<_, anyhow::Error>(store.remove(&req.key).await?) }
        })?;

        channel.start();
        info!(
            "Background context {} started on {} backend ({} registered slots)",
            channel.local_context(),
            adapter.backend_name(),
            registry.len()
        );

        Ok(Self {
            channel,
            adapter,
            registry,
            broadcaster,
        })
    }

    pub fn id(&self) -> ContextId {
        self.channel.local_context()
    }

    pub fn channel(&self) -> &RpcChannel {
        &self.channel
    }

    /// The canonical store adapter.
    pub fn adapter(&self) -> &StoreAdapter {
        &self.adapter
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Whether backend changes are still being broadcast.
    pub fn is_broadcasting(&self) -> bool {
        self.broadcaster.is_running()
    }

    /// Stops broadcasting and disconnects from the hub.
    pub async fn close(&self) {
        self.broadcaster.stop();
        self.channel.close().await;
    }
}

impl Drop for BackgroundContext {
    fn drop(&mut self) {
        self.channel.disconnect();
    }
}
