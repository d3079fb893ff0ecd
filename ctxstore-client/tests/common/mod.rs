#![allow(dead_code)]

use ctxstore_backend::{KeyValueBackend, MemoryBackend};
use ctxstore_client::{BackgroundConfig, BackgroundContext, ClientConfig, ClientContext};
use ctxstore_rpc::Hub;
use ctxstore_schema::KeyRegistry;
use ctxstore_types::ContextKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct Harness {
    pub hub: Hub,
    pub backend: Arc<MemoryBackend>,
    pub background: BackgroundContext,
}

impl Harness {
    pub fn start() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Arc<MemoryBackend>) -> Self {
        let hub = Hub::default();
        let background = start_background(&hub, backend.clone(), BackgroundConfig::default());
        Self {
            hub,
            backend,
            background,
        }
    }

    pub fn client(&self, kind: ContextKind) -> ClientContext {
        ClientContext::connect(&self.hub, kind, ClientConfig::default()).unwrap()
    }
}

pub fn start_background(
    hub: &Hub,
    backend: Arc<dyn KeyValueBackend>,
    config: BackgroundConfig,
) -> BackgroundContext {
    BackgroundContext::start(hub, backend, KeyRegistry::builtin().unwrap(), config).unwrap()
}

/// Receives the next value or fails after two seconds.
pub async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a value")
        .expect("sender dropped")
}

/// Asserts nothing arrives within a short grace period.
pub async fn assert_quiet<T: std::fmt::Debug>(rx: &mut mpsc::UnboundedReceiver<T>) {
    if let Ok(Some(value)) = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await {
        panic!("expected no value, got {value:?}");
    }
}

/// A callback that forwards every value into a channel.
pub fn recorder<T: Send + 'static>() -> (
    impl Fn(T) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<T>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |value| {
            let _ = tx.send(value);
        },
        rx,
    )
}
