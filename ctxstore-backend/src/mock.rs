//! A backend with switchable failures, for testing error propagation.

use crate::backend::{ChangeFeed, KeyValueBackend};
use crate::error::{BackendError, BackendResult};
use crate::memory::MemoryBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Wraps a [`MemoryBackend`]; each operation can be made to fail on demand.
#[derive(Default)]
pub struct FlakyBackend {
    inner: MemoryBackend,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get` fail until switched back.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` and `remove` fail until switched back.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Total get/set/remove calls seen, failed or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if flag.load(Ordering::SeqCst) {
            Err(BackendError::Unavailable(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        self.check(&self.fail_reads, "get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> BackendResult<()> {
        self.check(&self.fail_writes, "set")?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.check(&self.fail_writes, "remove")?;
        self.inner.remove(key).await
    }

    fn subscribe(&self) -> ChangeFeed {
        self.inner.subscribe()
    }
}
