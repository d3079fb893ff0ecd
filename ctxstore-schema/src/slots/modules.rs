use crate::{KeyDescriptor, Schema};
use serde::{Deserialize, Serialize};

pub const KEY: &str = "modules";

/// Icons a feature module may use.
///
/// Closed on purpose: an unknown icon name fails to decode when the slot is
/// loaded instead of surfacing as a missing icon at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleIcon {
    MessageSquarePlus,
    Sparkles,
}

impl ModuleIcon {
    pub const ALL: [ModuleIcon; 2] = [ModuleIcon::MessageSquarePlus, ModuleIcon::Sparkles];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MessageSquarePlus => "MessageSquarePlus",
            Self::Sparkles => "Sparkles",
        }
    }
}

/// A feature module shown in the popup navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: ModuleIcon,
    pub enabled: bool,
    pub order: u32,
}

pub fn default_modules() -> Vec<Module> {
    vec![
        Module {
            id: "prompt-manager".into(),
            name: "Prompt Manager".into(),
            description: "Manage and organise your AI prompts".into(),
            icon: ModuleIcon::MessageSquarePlus,
            enabled: false,
            order: 0,
        },
        Module {
            id: "ai-chat".into(),
            name: "AI Chat".into(),
            description: "Chat with an AI assistant".into(),
            icon: ModuleIcon::Sparkles,
            enabled: false,
            order: 1,
        },
    ]
}

pub fn schema() -> Schema {
    let module = Schema::object()
        .with_required(["id", "name", "description", "icon", "enabled", "order"])
        .with_property("id", Schema::string())
        .with_property("name", Schema::string())
        .with_property("description", Schema::string())
        .with_property(
            "icon",
            Schema::string_enum(ModuleIcon::ALL.iter().map(|icon| icon.as_str())),
        )
        .with_property("enabled", Schema::boolean())
        .with_property("order", Schema::integer());
    Schema::array(module)
}

pub fn descriptor() -> KeyDescriptor<Vec<Module>> {
    KeyDescriptor::new(KEY, default_modules(), schema()).with_description("Feature module settings")
}
