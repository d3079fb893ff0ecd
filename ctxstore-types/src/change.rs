use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw change to one storage slot, emitted once per backend mutation.
///
/// `old_value` is `None` when the slot was previously empty; `new_value` is
/// `None` when the slot was removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageChange {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl StorageChange {
    /// Creates a change event for `key`.
    pub fn new(key: impl Into<String>, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
        }
    }

    /// Whether this change removed the slot.
    pub fn is_removal(&self) -> bool {
        self.new_value.is_none()
    }
}
