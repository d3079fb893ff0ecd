//! Key registry and slot schemas for ctxstore.
//!
//! Defines the static description of every storage slot:
//! - [`KeyDescriptor`]: key name, default value, schema, description
//! - [`Schema`]: a JSON-Schema subset used to validate slot values
//! - [`KeyRegistry`]: the set of descriptors a background context enforces
//! - [`slots`]: the built-in slots (theme, prompts, modules, action config)
//!
//! Descriptors are created at process start and never change. They carry no
//! behaviour beyond validation; reading and writing happens in `ctxstore-client`.

mod descriptor;
mod error;
mod registry;
mod schema;
pub mod slots;

pub use descriptor::KeyDescriptor;
pub use error::{SchemaError, SchemaResult, ValidationError};
pub use registry::{KeyRegistry, SlotSpec};
pub use schema::{Schema, SchemaType};
