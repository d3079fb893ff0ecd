use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use serde::Serialize;
use serde_json::Value;

/// Static description of one storage slot.
///
/// Immutable once built: the fields are private and only readable through
/// accessors. The key must be unique across the whole registry.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor<T> {
    key: String,
    default_value: T,
    schema: Schema,
    description: Option<String>,
}

impl<T> KeyDescriptor<T> {
    /// Creates a descriptor with no description.
    pub fn new(key: impl Into<String>, default_value: T, schema: Schema) -> Self {
        Self {
            key: key.into(),
            default_value,
            schema,
            description: None,
        }
    }

    /// Attaches a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validates an already-encoded value against this slot's schema.
    pub fn validate_json(&self, value: &Value) -> SchemaResult<()> {
        self.schema
            .validate(value)
            .map_err(|source| SchemaError::Validation {
                key: self.key.clone(),
                source,
            })
    }
}

impl<T: Serialize> KeyDescriptor<T> {
    /// Encodes `value` and validates it, returning the encoded form.
    pub fn encode(&self, value: &T) -> SchemaResult<Value> {
        let encoded = serde_json::to_value(value)?;
        self.validate_json(&encoded)?;
        Ok(encoded)
    }

    /// Validates `value` against this slot's schema.
    pub fn validate(&self, value: &T) -> SchemaResult<()> {
        self.encode(value).map(|_| ())
    }

    /// Encodes the default value, checking it satisfies the schema.
    pub fn encoded_default(&self) -> SchemaResult<Value> {
        let encoded = serde_json::to_value(&self.default_value)?;
        self.schema
            .validate(&encoded)
            .map_err(|source| SchemaError::InvalidDefault {
                key: self.key.clone(),
                source,
            })?;
        Ok(encoded)
    }
}
