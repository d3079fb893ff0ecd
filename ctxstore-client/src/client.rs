//! Non-privileged context runtime (content scripts, popups).

use crate::config::ClientConfig;
use crate::error::{StorageError, StorageResult};
use crate::handle::StorageFactory;
use crate::mux::SubscriptionMux;
use crate::remote::RemoteStore;
use ctxstore_rpc::{Hub, RpcChannel};
use ctxstore_types::{ContextId, ContextKind};
use std::sync::Arc;
use tracing::info;

/// A context that reads and watches the store through the privileged one.
pub struct ClientContext {
    channel: RpcChannel,
    remote: RemoteStore,
    mux: SubscriptionMux,
    storage: StorageFactory,
}

impl ClientContext {
    /// Connects to `hub` as a `kind` context and starts its dispatch loop.
    ///
    /// Must be called within a tokio runtime.
    pub fn connect(hub: &Hub, kind: ContextKind, config: ClientConfig) -> StorageResult<Self> {
        if kind.is_privileged() {
            return Err(StorageError::PrivilegedClient);
        }
        let channel = RpcChannel::new(Arc::new(hub.connect(kind)?));
        channel.start();

        let remote = RemoteStore::new(channel.clone());
        let mux = SubscriptionMux::new(channel.clone());
        let storage = StorageFactory::new(remote.clone(), mux.clone(), config.validate_writes);
        info!("{} context {} ready", kind, channel.local_context());

        Ok(Self {
            channel,
            remote,
            mux,
            storage,
        })
    }

    pub fn id(&self) -> ContextId {
        self.channel.local_context()
    }

    pub fn kind(&self) -> ContextKind {
        self.channel.kind()
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_open()
    }

    /// Handle factory for this context.
    pub fn storage(&self) -> &StorageFactory {
        &self.storage
    }

    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    pub fn mux(&self) -> &SubscriptionMux {
        &self.mux
    }

    pub fn channel(&self) -> &RpcChannel {
        &self.channel
    }

    /// Tears the context down. Changes queued for it are dropped.
    pub async fn close(&self) {
        self.channel.close().await;
    }
}

impl Drop for ClientContext {
    fn drop(&mut self) {
        self.channel.disconnect();
    }
}
