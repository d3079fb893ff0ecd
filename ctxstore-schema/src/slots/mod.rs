//! Built-in storage slots.
//!
//! Each submodule defines the slot's value type and a `descriptor()`
//! constructor. Wire field names stay camelCase so stored data is readable by
//! every context regardless of language.

pub mod actions;
pub mod modules;
pub mod prompts;
pub mod theme;

pub use actions::{ActionConfig, ActionType};
pub use modules::{Module, ModuleIcon};
pub use prompts::Prompt;
pub use theme::Theme;

/// Milliseconds since the Unix epoch, the timestamp unit every slot uses.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
