//! RPC protocol messages.
//!
//! Every message has a fixed name and a fixed payload shape. Requests also
//! have a response shape; notifications do not, and their senders never wait
//! for the receiver's work to finish.
//!
//! On the wire a message is an [`Envelope`] `{ name, data }` and the answer is
//! a [`Reply`].

use ctxstore_types::StorageChange;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named message with a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Encodes `payload` under `name`.
    pub fn encode<P: Serialize>(name: &str, payload: &P) -> Result<Self, serde_json::Error> {
        Ok(Self::new(name, serde_json::to_value(payload)?))
    }
}

/// The receiving side's answer to an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// The handler succeeded.
    Ok(Value),
    /// No handler is registered for the name, or the receiver went away.
    NoHandler,
    /// The handler failed with this message.
    Failed(String),
}

/// A request/response message.
pub trait RpcRequest: Send + Sync + 'static {
    const NAME: &'static str;
    type Request: Serialize + DeserializeOwned + Send + 'static;
    type Response: Serialize + DeserializeOwned + Send + 'static;
}

/// A fire-and-forget message.
pub trait RpcNotification: Send + Sync + 'static {
    const NAME: &'static str;
    type Payload: Serialize + DeserializeOwned + Send + 'static;
}

// ── Storage protocol ─────────────────────────────────────────────

/// `storageGet(key) -> value | none`
pub struct StorageGet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageGetRequest {
    pub key: String,
}

impl RpcRequest for StorageGet {
    const NAME: &'static str = "storageGet";
    type Request = StorageGetRequest;
    type Response = Option<Value>;
}

/// `storageSet(key, value)`
pub struct StorageSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSetRequest {
    pub key: String,
    pub value: Value,
}

impl RpcRequest for StorageSet {
    const NAME: &'static str = "storageSet";
    type Request = StorageSetRequest;
    type Response = ();
}

/// `storageRemove(key)`
pub struct StorageRemove;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageRemoveRequest {
    pub key: String,
}

impl RpcRequest for StorageRemove {
    const NAME: &'static str = "storageRemove";
    type Request = StorageRemoveRequest;
    type Response = ();
}

/// `storageChanged(key, old_value, new_value)`, broadcast by the privileged
/// context after every backend mutation.
pub struct StorageChanged;

impl RpcNotification for StorageChanged {
    const NAME: &'static str = "storageChanged";
    type Payload = StorageChange;
}
