//! JSON file backend.
//!
//! The whole key space is one JSON object on disk. Every mutation rewrites
//! the file through a temp file and a rename, so a crash leaves either the
//! old or the new contents, never a torn file.

use crate::backend::{ChangeFeed, KeyValueBackend, DEFAULT_FEED_CAPACITY};
use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use ctxstore_types::StorageChange;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

pub struct JsonFileBackend {
    path: PathBuf,
    slots: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl JsonFileBackend {
    /// Opens the file at `path`, creating an empty store if it does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> BackendResult<Self> {
        let path = path.into();
        let slots = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Map::new(),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => map,
                other => {
                    return Err(BackendError::InvalidData(format!(
                        "{} does not hold a JSON object (found {})",
                        path.display(),
                        short_type(&other)
                    )));
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Opened JSON store {} ({} slots)", path.display(), slots.len());

        let (changes, _) = broadcast::channel(DEFAULT_FEED_CAPACITY);
        Ok(Self {
            path,
            slots: Mutex::new(slots),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, slots: &Map<String, Value>) -> BackendResult<()> {
        let data = serde_json::to_vec_pretty(slots)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }
}

fn short_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl KeyValueBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Value>> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> BackendResult<()> {
        let mut slots = self.slots.lock().await;
        let old = slots.get(key).cloned();
        if old.as_ref() == Some(&value) {
            return Ok(());
        }

        // Only commit in memory once the file write succeeded.
        let mut next = slots.clone();
        next.insert(key.to_string(), value.clone());
        self.persist(&next).await?;
        *slots = next;

        let _ = self.changes.send(StorageChange::new(key, old, Some(value)));
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        let mut slots = self.slots.lock().await;
        let Some(old) = slots.get(key).cloned() else {
            return Ok(());
        };

        let mut next = slots.clone();
        next.remove(key);
        self.persist(&next).await?;
        *slots = next;

        let _ = self.changes.send(StorageChange::new(key, Some(old), None));
        Ok(())
    }

    fn subscribe(&self) -> ChangeFeed {
        self.changes.subscribe()
    }
}
