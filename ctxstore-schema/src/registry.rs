use crate::descriptor::KeyDescriptor;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use crate::slots;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// The type-erased form of a [`KeyDescriptor`], as held by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    pub key: String,
    pub default_value: Value,
    pub schema: Schema,
    pub description: Option<String>,
}

/// All known slots, keyed by name.
///
/// The background context uses this to validate incoming writes. Keys that
/// are not registered are stored without validation.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    slots: BTreeMap<String, SlotSpec>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in slot.
    pub fn builtin() -> SchemaResult<Self> {
        let mut registry = Self::new();
        registry.register(&slots::theme::descriptor())?;
        registry.register(&slots::prompts::descriptor())?;
        registry.register(&slots::modules::descriptor())?;
        registry.register(&slots::actions::descriptor())?;
        Ok(registry)
    }

    /// Registers a descriptor. Fails on a duplicate key or when the
    /// descriptor's default does not satisfy its own schema.
    pub fn register<T: Serialize>(&mut self, descriptor: &KeyDescriptor<T>) -> SchemaResult<()> {
        if self.slots.contains_key(descriptor.key()) {
            return Err(SchemaError::DuplicateKey(descriptor.key().to_string()));
        }
        let default_value = descriptor.encoded_default()?;
        self.slots.insert(
            descriptor.key().to_string(),
            SlotSpec {
                key: descriptor.key().to_string(),
                default_value,
                schema: descriptor.schema().clone(),
                description: descriptor.description().map(str::to_string),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&SlotSpec> {
        self.slots.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validates `value` for `key`. Unregistered keys always pass.
    pub fn validate(&self, key: &str, value: &Value) -> SchemaResult<()> {
        match self.slots.get(key) {
            Some(spec) => spec
                .schema
                .validate(value)
                .map_err(|source| SchemaError::Validation {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(()),
        }
    }
}
