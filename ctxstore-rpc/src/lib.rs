//! Typed inter-context RPC for ctxstore.
//!
//! Contexts share no memory. Everything they exchange is a named
//! [`Envelope`] carrying a JSON payload, routed by a [`Transport`].
//!
//! # Components
//!
//! - **Protocol**: message names and their request/response shapes
//!   ([`RpcRequest`], [`RpcNotification`], the `storage*` messages)
//! - **Transport**: delivers envelopes between contexts and reports
//!   "no receiver" separately from handler failures
//! - **Hub**: the in-process transport; one [`Port`] per context, at most
//!   one privileged context
//! - **Channel**: per-context handler registry, dispatch loop, and typed
//!   `request` / `notify` calls
//!
//! # Example
//!
//! ```no_run
//! use ctxstore_rpc::{Hub, HubConfig, RpcChannel, StorageGet, StorageGetRequest};
//! use ctxstore_types::ContextKind;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), ctxstore_rpc::RpcError> {
//! let hub = Hub::new(HubConfig::default());
//! let background = RpcChannel::new(Arc::new(hub.connect(ContextKind::Background)?));
//! background.on_request::<StorageGet, _, _>(|_req| async { Ok(None) })?;
//! background.start();
//!
//! let popup = RpcChannel::new(Arc::new(hub.connect(ContextKind::Popup)?));
//! popup.start();
//! let value = popup.request::<StorageGet>(StorageGetRequest { key: "theme".into() }).await?;
//! assert!(value.is_none());
//! # Ok(())
//! # }
//! ```

mod channel;
mod error;
mod hub;
pub mod protocol;
pub mod transport;

pub use channel::{PendingNotification, RpcChannel};
pub use error::{NotifyError, RpcError, RpcResult};
pub use hub::{Hub, HubConfig, Port};
pub use protocol::{
    Envelope, Reply, RpcNotification, RpcRequest, StorageChanged, StorageGet, StorageGetRequest,
    StorageRemove, StorageRemoveRequest, StorageSet, StorageSetRequest,
};
pub use transport::{Inbound, PendingReply, Target, Transport};
