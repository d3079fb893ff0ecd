//! Per-context RPC channel.
//!
//! The channel owns the context's handler table and its dispatch loop. The
//! loop takes inbound envelopes one at a time, in arrival order, and awaits
//! each handler before taking the next; that is what keeps sequential calls
//! from one context in issue order on the receiving side.

use crate::error::{NotifyError, RpcError, RpcResult};
use crate::protocol::{Envelope, Reply, RpcNotification, RpcRequest};
use crate::transport::{Inbound, PendingReply, Target, Transport};
use anyhow::Context as _;
use ctxstore_types::{ContextId, ContextKind};
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

type Handler = Arc<dyn Fn(ContextId, Value) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

struct ChannelInner {
    transport: Arc<dyn Transport>,
    handlers: RwLock<HashMap<&'static str, Handler>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

/// A context's typed view of the transport.
///
/// Cheap to clone; clones share the handler table.
#[derive(Clone)]
pub struct RpcChannel {
    inner: Arc<ChannelInner>,
}

impl RpcChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                transport,
                handlers: RwLock::new(HashMap::new()),
                dispatcher: Mutex::new(None),
            }),
        }
    }

    pub fn local_context(&self) -> ContextId {
        self.inner.transport.local_context()
    }

    pub fn kind(&self) -> ContextKind {
        self.inner.transport.kind()
    }

    pub fn is_open(&self) -> bool {
        self.inner.transport.is_open()
    }

    /// Whether a handler is registered for `name`.
    pub fn has_handler(&self, name: &str) -> bool {
        self.inner
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    // ── Handler registration ─────────────────────────────────────

    /// Registers the handler for request `M`. Only one handler per name.
    pub fn on_request<M, F, Fut>(&self, handler: F) -> RpcResult<()>
    where
        M: RpcRequest,
        F: Fn(M::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<M::Response>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.register(
            M::NAME,
            Arc::new(
                move |_from: ContextId, data: Value| -> BoxFuture<'static, anyhow::Result<Value>> {
                    let handler = handler.clone();
                    async move {
                        let request: M::Request = serde_json::from_value(data)
                            .with_context(|| format!("invalid {} payload", M::NAME))?;
                        let response = (*handler)(request).await?;
                        Ok::<_, anyhow::Error>(serde_json::to_value(response)?)
                    }
                    .boxed()
                },
            ),
        )
    }

    /// Registers the handler for notification `N`. The handler runs
    /// synchronously on the dispatch loop.
    pub fn on_notification<N, F>(&self, handler: F) -> RpcResult<()>
    where
        N: RpcNotification,
        F: Fn(N::Payload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(
            N::NAME,
            Arc::new(
                move |_from: ContextId, data: Value| -> BoxFuture<'static, anyhow::Result<Value>> {
                    let result = serde_json::from_value::<N::Payload>(data)
                        .with_context(|| format!("invalid {} payload", N::NAME))
                        .and_then(|payload| handler(payload))
                        .map(|()| Value::Null);
                    future::ready(result).boxed()
                },
            ),
        )
    }

    /// Removes the handler for `name`. Returns whether one was registered.
    pub fn remove_handler(&self, name: &str) -> bool {
        self.inner
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    fn register(&self, name: &'static str, handler: Handler) -> RpcResult<()> {
        let mut handlers = self
            .inner
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(name) {
            return Err(RpcError::DuplicateHandler(name.to_string()));
        }
        handlers.insert(name, handler);
        debug!("{} registered handler '{}'", self.local_context(), name);
        Ok(())
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Starts the dispatch loop. Calling it again is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut dispatcher = self
            .inner
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if dispatcher.is_some() {
            return;
        }
        let inner = self.inner.clone();
        *dispatcher = Some(tokio::spawn(async move { inner.run().await }));
    }

    // ── Outbound ─────────────────────────────────────────────────

    /// Sends request `M` to the privileged context and waits for the answer.
    pub async fn request<M: RpcRequest>(&self, request: M::Request) -> RpcResult<M::Response> {
        self.request_to::<M>(Target::Privileged, request).await
    }

    /// Sends request `M` to `target` and waits for the answer.
    pub async fn request_to<M: RpcRequest>(
        &self,
        target: Target,
        request: M::Request,
    ) -> RpcResult<M::Response> {
        let envelope = Envelope::encode(M::NAME, &request)?;
        let pending = self.inner.transport.deliver(target, envelope).await?;
        match pending.wait().await {
            Reply::Ok(value) => Ok(serde_json::from_value(value)?),
            Reply::NoHandler => Err(RpcError::Unreachable {
                name: M::NAME.to_string(),
            }),
            Reply::Failed(message) => Err(RpcError::Handler {
                name: M::NAME.to_string(),
                message,
            }),
        }
    }

    /// Queues notification `N` for `target` and returns without waiting for
    /// it to be handled.
    ///
    /// Fails immediately with [`NotifyError::Unreachable`] if `target` is not
    /// connected. The returned [`PendingNotification`] reports what happened
    /// at the receiver; callers that don't care can drop it.
    pub async fn notify<N: RpcNotification>(
        &self,
        target: ContextId,
        payload: &N::Payload,
    ) -> Result<PendingNotification, NotifyError> {
        let envelope = Envelope::encode(N::NAME, payload)?;
        match self
            .inner
            .transport
            .deliver(Target::Context(target), envelope)
            .await
        {
            Ok(pending) => Ok(PendingNotification { pending }),
            Err(RpcError::Unreachable { .. } | RpcError::ChannelClosed) => {
                Err(NotifyError::Unreachable)
            }
            Err(e) => Err(NotifyError::Handler(e.to_string())),
        }
    }

    /// Every other context currently connected.
    pub async fn reachable_contexts(&self) -> Vec<ContextId> {
        self.inner.transport.reachable_contexts().await
    }

    /// Closes this context. Envelopes still queued for it are dropped and
    /// their senders see "no receiver".
    pub async fn close(&self) {
        self.inner.transport.close().await;
        info!("{} context {} closed", self.kind(), self.local_context());
    }

    /// Same as [`close`](Self::close), without waiting. The dispatch loop
    /// drains what is queued and then exits, releasing the transport.
    pub fn disconnect(&self) {
        if self.is_open() {
            self.inner.transport.disconnect();
            info!("{} context {} disconnected", self.kind(), self.local_context());
        }
    }
}

impl ChannelInner {
    async fn run(self: Arc<Self>) {
        let id = self.transport.local_context();
        while let Some(inbound) = self.transport.recv().await {
            if !self.transport.is_open() {
                debug!("{} closed, dropping '{}'", id, inbound.envelope.name);
                continue;
            }
            self.dispatch(inbound).await;
        }
        debug!("{} dispatch loop finished", id);
    }

    async fn dispatch(&self, mut inbound: Inbound) {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(inbound.envelope.name.as_str())
            .cloned();

        let Some(handler) = handler else {
            debug!(
                "{} has no handler for '{}'",
                self.transport.local_context(),
                inbound.envelope.name
            );
            inbound.respond(Reply::NoHandler);
            return;
        };

        let data = std::mem::take(&mut inbound.envelope.data);
        let reply = match handler(inbound.from, data).await {
            Ok(value) => Reply::Ok(value),
            Err(e) => {
                debug!("'{}' handler failed: {e:#}", inbound.envelope.name);
                Reply::Failed(format!("{e:#}"))
            }
        };
        inbound.respond(reply);
    }
}

/// A notification that has been queued at its receiver.
#[derive(Debug)]
pub struct PendingNotification {
    pending: PendingReply,
}

impl PendingNotification {
    /// Waits for the receiver to handle the notification.
    pub async fn outcome(self) -> Result<(), NotifyError> {
        match self.pending.wait().await {
            Reply::Ok(_) => Ok(()),
            Reply::NoHandler => Err(NotifyError::Unreachable),
            Reply::Failed(message) => Err(NotifyError::Handler(message)),
        }
    }
}
