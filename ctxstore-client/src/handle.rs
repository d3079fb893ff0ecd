//! Typed storage handles.

use crate::error::{StorageError, StorageResult};
use crate::mux::{Subscription, SubscriptionMux};
use crate::remote::RemoteStore;
use ctxstore_schema::slots::{self, ActionConfig, Module, Prompt, Theme};
use ctxstore_schema::KeyDescriptor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Bounds every slot value type satisfies.
pub trait SlotValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> SlotValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Typed access to one slot.
///
/// Holds no value. Every read goes to the privileged context, so two handles
/// for the same key always agree.
pub struct StorageHandle<T> {
    descriptor: Arc<KeyDescriptor<T>>,
    remote: RemoteStore,
    mux: SubscriptionMux,
    validate_writes: bool,
}

impl<T> Clone for StorageHandle<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            remote: self.remote.clone(),
            mux: self.mux.clone(),
            validate_writes: self.validate_writes,
        }
    }
}

impl<T: SlotValue> StorageHandle<T> {
    pub fn key(&self) -> &str {
        self.descriptor.key()
    }

    /// The descriptor this handle is bound to.
    pub fn config(&self) -> &KeyDescriptor<T> {
        &self.descriptor
    }

    /// Reads the slot. `None` when it holds nothing.
    pub async fn get(&self) -> StorageResult<Option<T>> {
        match self.remote.get(self.key()).await? {
            Some(value) => decode(self.key(), value).map(Some),
            None => Ok(None),
        }
    }

    /// Writes the slot. Every watcher in every other context is notified.
    pub async fn set(&self, value: &T) -> StorageResult<()> {
        let encoded = if self.validate_writes {
            self.descriptor.encode(value)?
        } else {
            serde_json::to_value(value).map_err(|source| StorageError::Encode {
                key: self.key().to_string(),
                source,
            })?
        };
        self.remote.set(self.key(), encoded).await?;
        Ok(())
    }

    /// Reads the slot, falling back to the default when it is empty or the
    /// read fails. Never fails.
    pub async fn get_with_default(&self) -> T {
        match self.get().await {
            Ok(Some(value)) => value,
            Ok(None) => self.descriptor.default_value().clone(),
            Err(e) => {
                warn!("Failed to read '{}', using default: {}", self.key(), e);
                self.descriptor.default_value().clone()
            }
        }
    }

    /// Writes the default value.
    pub async fn reset(&self) -> StorageResult<()> {
        self.set(self.descriptor.default_value()).await
    }

    /// Empties the slot.
    pub async fn remove(&self) -> StorageResult<()> {
        self.remote.remove(self.key()).await?;
        Ok(())
    }

    /// Calls `callback` with the current value now and with every later
    /// value. A removed, empty, or unreadable slot is reported as the default.
    pub async fn watch<F>(&self, callback: F) -> StorageResult<Subscription>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let descriptor = self.descriptor.clone();
        let subscription = self
            .mux
            .watch_raw(self.key().to_string(), move |value| {
                let value = match value.map(|v| decode::<T>(descriptor.key(), v)) {
                    Some(Ok(value)) => value,
                    Some(Err(e)) => {
                        warn!("{}, using default", e);
                        descriptor.default_value().clone()
                    }
                    None => descriptor.default_value().clone(),
                };
                callback(value);
            })
            .await?;
        Ok(subscription)
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> StorageResult<T> {
    serde_json::from_value(value).map_err(|source| StorageError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Builds storage handles for one context.
#[derive(Clone)]
pub struct StorageFactory {
    remote: RemoteStore,
    mux: SubscriptionMux,
    validate_writes: bool,
}

impl StorageFactory {
    pub fn new(remote: RemoteStore, mux: SubscriptionMux, validate_writes: bool) -> Self {
        Self {
            remote,
            mux,
            validate_writes,
        }
    }

    /// A handle bound to `descriptor`.
    pub fn handle<T: SlotValue>(&self, descriptor: KeyDescriptor<T>) -> StorageHandle<T> {
        StorageHandle {
            descriptor: Arc::new(descriptor),
            remote: self.remote.clone(),
            mux: self.mux.clone(),
            validate_writes: self.validate_writes,
        }
    }

    pub fn theme(&self) -> StorageHandle<Theme> {
        self.handle(slots::theme::descriptor())
    }

    pub fn prompts(&self) -> StorageHandle<Vec<Prompt>> {
        self.handle(slots::prompts::descriptor())
    }

    pub fn modules(&self) -> StorageHandle<Vec<Module>> {
        self.handle(slots::modules::descriptor())
    }

    pub fn action_config(&self) -> StorageHandle<ActionConfig> {
        self.handle(slots::actions::descriptor())
    }
}
