//! Reactive storage for ctxstore contexts.
//!
//! - [`BackgroundContext`]: the privileged context, which owns the store
//!   adapter and answers `storage*` requests
//! - [`ClientContext`]: any other context, holding a [`RemoteStore`], a
//!   [`SubscriptionMux`] and a [`StorageFactory`] for typed handles
//! - [`StorageHandle`]: `get`, `set`, `get_with_default`, `reset`, `remove`,
//!   `watch`, `config` for one slot
//!
//! # Example
//!
//! ```no_run
//! use ctxstore_backend::MemoryBackend;
//! use ctxstore_client::{BackgroundConfig, BackgroundContext, ClientConfig, ClientContext};
//! use ctxstore_rpc::Hub;
//! use ctxstore_schema::{slots::Theme, KeyRegistry};
//! use ctxstore_types::ContextKind;
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let hub = Hub::default();
//! let _background = BackgroundContext::start(
//!     &hub,
//!     Arc::new(MemoryBackend::new()),
//!     KeyRegistry::builtin()?,
//!     BackgroundConfig::default(),
//! )?;
//!
//! let popup = ClientContext::connect(&hub, ContextKind::Popup, ClientConfig::default())?;
//! let theme = popup.storage().theme();
//! let watch = theme.watch(|t| println!("theme is now {t:?}")).await?;
//! theme.set(&Theme::Dark).await?;
//! watch.unsubscribe();
//! # Ok(())
//! # }
//! ```

mod background;
mod broadcaster;
mod client;
mod config;
mod error;
mod handle;
mod mux;
mod remote;

pub use background::BackgroundContext;
pub use broadcaster::ChangeBroadcaster;
pub use client::ClientContext;
pub use config::{BackgroundConfig, ClientConfig};
pub use error::{StorageError, StorageResult};
pub use handle::{SlotValue, StorageFactory, StorageHandle};
pub use mux::{RawCallback, Subscription, SubscriptionMux};
pub use remote::RemoteStore;
