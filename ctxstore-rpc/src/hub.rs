//! In-process transport.
//!
//! The hub plays the role of the host runtime's message router: every
//! context connects to it and gets a [`Port`]. Payloads cross it only as
//! JSON values, so no Rust object is ever shared between contexts.

use crate::error::{RpcError, RpcResult};
use crate::protocol::Envelope;
use crate::transport::{Inbound, PendingReply, Target, Transport};
use async_trait::async_trait;
use ctxstore_types::{ContextId, ContextKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Configuration for a hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Name used in logs.
    pub name: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            name: "ctxstore".to_string(),
        }
    }
}

struct Route {
    kind: ContextKind,
    inbox: mpsc::UnboundedSender<Inbound>,
}

#[derive(Default)]
struct Routes {
    table: HashMap<ContextId, Route>,
    privileged: Option<ContextId>,
}

struct HubInner {
    config: HubConfig,
    routes: RwLock<Routes>,
}

/// Routes envelopes between connected contexts.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                routes: RwLock::new(Routes::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Connects a new context. Fails if `kind` is privileged and another
    /// privileged context is still connected.
    pub fn connect(&self, kind: ContextKind) -> RpcResult<Port> {
        let mut routes = self.write();
        if kind.is_privileged() && routes.privileged.is_some() {
            return Err(RpcError::PrivilegedContextTaken);
        }

        let id = ContextId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        routes.table.insert(id, Route { kind, inbox: tx });
        if kind.is_privileged() {
            routes.privileged = Some(id);
        }
        info!("[{}] {} context {} connected", self.name(), kind, id);

        Ok(Port {
            id,
            kind,
            hub: self.clone(),
            inbox: Mutex::new(rx),
            open: AtomicBool::new(true),
        })
    }

    /// Every connected context.
    pub fn contexts(&self) -> Vec<(ContextId, ContextKind)> {
        self.read()
            .table
            .iter()
            .map(|(id, route)| (*id, route.kind))
            .collect()
    }

    /// The connected privileged context, if any.
    pub fn privileged_context(&self) -> Option<ContextId> {
        self.read().privileged
    }

    /// Whether `id` is currently connected.
    pub fn is_connected(&self, id: ContextId) -> bool {
        self.read().table.contains_key(&id)
    }

    /// Number of connected contexts.
    pub fn len(&self) -> usize {
        self.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().table.is_empty()
    }

    fn route(&self, target: Target) -> Option<mpsc::UnboundedSender<Inbound>> {
        let routes = self.read();
        let id = match target {
            Target::Privileged => routes.privileged?,
            Target::Context(id) => id,
        };
        routes.table.get(&id).map(|route| route.inbox.clone())
    }

    fn disconnect(&self, id: ContextId) {
        let mut routes = self.write();
        if let Some(route) = routes.table.remove(&id) {
            if routes.privileged == Some(id) {
                routes.privileged = None;
            }
            info!("[{}] {} context {} disconnected", self.name(), route.kind, id);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Routes> {
        self.inner.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Routes> {
        self.inner.routes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// One context's end of the hub.
///
/// Dropping the port disconnects the context, same as [`Transport::close`].
/// A port owned by an [`RpcChannel`](crate::RpcChannel) is kept alive by the
/// channel's dispatch loop, so it has to be closed explicitly.
pub struct Port {
    id: ContextId,
    kind: ContextKind,
    hub: Hub,
    inbox: Mutex<mpsc::UnboundedReceiver<Inbound>>,
    open: AtomicBool,
}

impl Port {
    /// The hub this port belongs to.
    pub fn hub(&self) -> &Hub {
        &self.hub
    }
}

#[async_trait]
impl Transport for Port {
    fn local_context(&self) -> ContextId {
        self.id
    }

    fn kind(&self) -> ContextKind {
        self.kind
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn deliver(&self, target: Target, envelope: Envelope) -> RpcResult<PendingReply> {
        if !self.is_open() {
            return Err(RpcError::ChannelClosed);
        }
        let name = envelope.name.clone();
        let inbox = self
            .hub
            .route(target)
            .ok_or_else(|| RpcError::Unreachable { name: name.clone() })?;

        let (inbound, pending) = Inbound::new(self.id, envelope);
        inbox
            .send(inbound)
            .map_err(|_| RpcError::Unreachable { name: name.clone() })?;
        debug!("{} -> {}: {}", self.id, target, name);
        Ok(pending)
    }

    async fn reachable_contexts(&self) -> Vec<ContextId> {
        self.hub
            .contexts()
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| *id != self.id)
            .collect()
    }

    async fn recv(&self) -> Option<Inbound> {
        self.inbox.lock().await.recv().await
    }

    fn disconnect(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.hub.disconnect(self.id);
        }
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        self.hub.disconnect(self.id);
    }
}
