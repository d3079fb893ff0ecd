use crate::{KeyDescriptor, Schema};
use serde::{Deserialize, Serialize};

pub const KEY: &str = "theme";

/// UI colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

pub fn descriptor() -> KeyDescriptor<Theme> {
    KeyDescriptor::new(KEY, Theme::Light, Schema::string_enum(["light", "dark"]))
        .with_description("Colour theme shared by the popup and injected UI")
}
