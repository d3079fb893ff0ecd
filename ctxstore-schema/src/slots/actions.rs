use crate::{KeyDescriptor, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const KEY: &str = "action-config";

/// What the injected action button does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Copy the linked prompt into the page.
    #[default]
    Copy,
    /// Reserved for user-defined actions.
    Custom,
}

/// Configuration of the injected action area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub enabled: bool,
    /// Prompt copied by a `Copy` action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<Map<String, Value>>,
    pub updated_at: i64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            action_type: ActionType::Copy,
            enabled: false,
            prompt_id: None,
            custom_config: None,
            updated_at: super::now_millis(),
        }
    }
}

pub fn schema() -> Schema {
    Schema::object()
        .with_required(["type", "enabled", "updatedAt"])
        .with_property("type", Schema::string_enum(["copy", "custom"]))
        .with_property("enabled", Schema::boolean())
        .with_property("promptId", Schema::string())
        .with_property("customConfig", Schema::object())
        .with_property("updatedAt", Schema::number())
}

/// Built once per process, so the default's `updatedAt` is fixed.
static DESCRIPTOR: LazyLock<KeyDescriptor<ActionConfig>> = LazyLock::new(|| {
    KeyDescriptor::new(KEY, ActionConfig::default(), schema())
        .with_description("Action area configuration")
});

pub fn descriptor() -> KeyDescriptor<ActionConfig> {
    DESCRIPTOR.clone()
}
