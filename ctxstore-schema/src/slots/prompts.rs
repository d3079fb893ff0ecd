use crate::{KeyDescriptor, Schema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const KEY: &str = "prompts";

/// A saved prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Set when the prompt is the target of the copy action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_linked_to_action: Option<bool>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Prompt {
    /// Creates a prompt with a fresh id, stamped now.
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        let now = super::now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            tags,
            is_linked_to_action: None,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn schema() -> Schema {
    let prompt = Schema::object()
        .with_required(["id", "title", "content", "tags", "createdAt", "updatedAt"])
        .with_property("id", Schema::string())
        .with_property("title", Schema::string())
        .with_property("content", Schema::string())
        .with_property("tags", Schema::array(Schema::string()))
        .with_property("isLinkedToAction", Schema::boolean())
        .with_property("createdAt", Schema::number())
        .with_property("updatedAt", Schema::number());
    Schema::array(prompt)
}

pub fn descriptor() -> KeyDescriptor<Vec<Prompt>> {
    KeyDescriptor::new(KEY, Vec::new(), schema()).with_description("Saved prompt list")
}
