//! Transport layer abstraction.
//!
//! A transport moves envelopes between contexts. It knows nothing about
//! message names or handlers; that is the channel's job. What it must do is
//! tell a sender when there is nobody to deliver to.

use crate::error::RpcResult;
use crate::protocol::{Envelope, Reply};
use async_trait::async_trait;
use ctxstore_types::{ContextId, ContextKind};
use std::fmt;
use tokio::sync::oneshot;

/// Where an envelope should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Whichever context currently owns the canonical store.
    Privileged,
    /// One specific context.
    Context(ContextId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Privileged => f.write_str("privileged context"),
            Self::Context(id) => write!(f, "context {id}"),
        }
    }
}

/// An envelope received by a context, with the slot to answer through.
pub struct Inbound {
    /// The context that sent it.
    pub from: ContextId,
    pub envelope: Envelope,
    reply: oneshot::Sender<Reply>,
}

impl Inbound {
    /// Pairs an envelope with a fresh reply slot.
    pub fn new(from: ContextId, envelope: Envelope) -> (Self, PendingReply) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                from,
                envelope,
                reply: tx,
            },
            PendingReply(rx),
        )
    }

    /// Answers the sender. A sender that stopped waiting is not an error.
    pub fn respond(self, reply: Reply) {
        let _ = self.reply.send(reply);
    }
}

/// The sender's side of an envelope in flight.
#[derive(Debug)]
pub struct PendingReply(oneshot::Receiver<Reply>);

impl PendingReply {
    /// Waits for the answer. If the receiving context drops the envelope
    /// without answering (it closed), this resolves to [`Reply::NoHandler`].
    pub async fn wait(self) -> Reply {
        self.0.await.unwrap_or(Reply::NoHandler)
    }
}

/// A context's connection to the other contexts.
#[async_trait]
pub trait Transport: Send + Sync {
    /// This context's id.
    fn local_context(&self) -> ContextId;

    /// This context's role.
    fn kind(&self) -> ContextKind;

    /// Whether this end is still open.
    fn is_open(&self) -> bool;

    /// Queues `envelope` for `target` without waiting for it to be handled.
    /// Fails with [`RpcError::Unreachable`](crate::RpcError::Unreachable)
    /// when the target does not exist.
    async fn deliver(&self, target: Target, envelope: Envelope) -> RpcResult<PendingReply>;

    /// Every other context currently connected.
    async fn reachable_contexts(&self) -> Vec<ContextId>;

    /// Receives the next envelope addressed to this context.
    /// Returns `None` once the transport is closed and drained.
    async fn recv(&self) -> Option<Inbound>;

    /// Disconnects this context without waiting. Envelopes still queued for
    /// it resolve as "no receiver". Idempotent, and safe to call from `Drop`.
    fn disconnect(&self);

    /// Disconnects this context.
    async fn close(&self) {
        self.disconnect();
    }
}
