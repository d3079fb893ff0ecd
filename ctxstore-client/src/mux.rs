//! Per-context subscription multiplexer.
//!
//! A context installs exactly one `storageChanged` handler, no matter how many
//! watchers it has. Incoming changes are fanned out to the callbacks
//! registered for that key. A key with no callbacks left has no entry.

use crate::remote::RemoteStore;
use ctxstore_rpc::{RpcChannel, RpcResult, StorageChanged};
use ctxstore_types::StorageChange;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

/// Receives a slot's value: `Some` for a stored value, `None` when the slot
/// is empty, was removed, or could not be read.
pub type RawCallback = Arc<dyn Fn(Option<Value>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct SubscriberId(u64);

struct Subscriber {
    callback: RawCallback,
    /// Set once the subscriber has been given a value; a late seed is skipped.
    delivered: Arc<AtomicBool>,
}

type SubscriberMap = HashMap<String, BTreeMap<SubscriberId, Subscriber>>;

struct MuxInner {
    channel: RpcChannel,
    remote: RemoteStore,
    subscribers: Mutex<SubscriberMap>,
    installed: Mutex<bool>,
    next_id: AtomicU64,
}

/// Fans `storageChanged` notifications out to per-key callbacks.
///
/// Owned by a context runtime; cheap to clone. Only one multiplexer can
/// watch through a given channel.
#[derive(Clone)]
pub struct SubscriptionMux {
    inner: Arc<MuxInner>,
}

impl SubscriptionMux {
    pub fn new(channel: RpcChannel) -> Self {
        let remote = RemoteStore::new(channel.clone());
        Self {
            inner: Arc::new(MuxInner {
                channel,
                remote,
                subscribers: Mutex::new(HashMap::new()),
                installed: Mutex::new(false),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Whether the `storageChanged` handler has been installed.
    pub fn is_installed(&self) -> bool {
        *self
            .inner
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live callbacks for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner.lock().get(key).map_or(0, BTreeMap::len)
    }

    /// Keys with at least one live callback.
    pub fn watched_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Watches `key`.
    ///
    /// The callback is registered first and then seeded with the slot's
    /// current value in one round trip. If that read fails the callback gets
    /// `None` and the failure is logged. If a change reaches the callback
    /// before the seed returns, the seed is dropped.
    ///
    /// Fails only when the `storageChanged` handler cannot be installed,
    /// which happens when another multiplexer already owns this channel.
    pub async fn watch_raw<F>(&self, key: impl Into<String>, callback: F) -> RpcResult<Subscription>
    where
        F: Fn(Option<Value>) + Send + Sync + 'static,
    {
        self.ensure_installed()?;

        let key = key.into();
        let callback: RawCallback = Arc::new(callback);
        let delivered = Arc::new(AtomicBool::new(false));
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.lock().entry(key.clone()).or_default().insert(
            id,
            Subscriber {
                callback: callback.clone(),
                delivered: delivered.clone(),
            },
        );
        debug!("Watching '{}' (subscriber {})", key, id.0);

        let seed = match self.inner.remote.get(&key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to seed watcher for '{}', using default: {}", key, e);
                None
            }
        };
        if !delivered.swap(true, Ordering::SeqCst) {
            invoke(&key, &callback, seed);
        }

        Ok(Subscription {
            mux: Arc::downgrade(&self.inner),
            key,
            id,
            active: true,
        })
    }

    fn ensure_installed(&self) -> RpcResult<()> {
        let mut installed = self
            .inner
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *installed {
            return Ok(());
        }

        let weak = Arc::downgrade(&self.inner);
        self.inner
            .channel
            .on_notification::<StorageChanged, _>(move |change| {
                if let Some(inner) = weak.upgrade() {
                    inner.dispatch(&change);
                }
                Ok(())
            })?;
        *installed = true;
        Ok(())
    }
}

impl MuxInner {
    fn lock(&self) -> MutexGuard<'_, SubscriberMap> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, change: &StorageChange) {
        // Callbacks run outside the lock so they may watch or unsubscribe.
        let targets: Vec<RawCallback> = {
            let subscribers = self.lock();
            let Some(set) = subscribers.get(&change.key) else {
                return;
            };
            set.values()
                .map(|subscriber| {
                    subscriber.delivered.store(true, Ordering::SeqCst);
                    subscriber.callback.clone()
                })
                .collect()
        };
        debug!(
            "Change to '{}' for {} watcher(s)",
            change.key,
            targets.len()
        );
        for callback in targets {
            invoke(&change.key, &callback, change.new_value.clone());
        }
    }

    fn remove(&self, key: &str, id: SubscriberId) {
        let mut subscribers = self.lock();
        if let Some(set) = subscribers.get_mut(key) {
            set.remove(&id);
            if set.is_empty() {
                subscribers.remove(key);
            }
        }
        debug!("Unsubscribed {} from '{}'", id.0, key);
    }
}

fn invoke(key: &str, callback: &RawCallback, value: Option<Value>) {
    if panic::catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
        warn!("Watcher for '{}' panicked", key);
    }
}

/// A live watch. Dropping it unsubscribes; call [`Subscription::detach`] to
/// keep the callback for the lifetime of the context instead.
#[must_use = "dropping a Subscription unsubscribes it"]
#[derive(Debug)]
pub struct Subscription {
    mux: Weak<MuxInner>,
    key: String,
    id: SubscriberId,
    active: bool,
}

impl Subscription {
    /// The watched key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Removes the callback. No further changes reach it.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keeps the callback registered without holding the guard.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !std::mem::take(&mut self.active) {
            return;
        }
        if let Some(inner) = self.mux.upgrade() {
            inner.remove(&self.key, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
