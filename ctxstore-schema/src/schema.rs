use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validation rules for one slot value.
///
/// This is the subset of JSON Schema the slots actually use: `type`, `enum`,
/// `required`, `properties` and `items`. Unset rules accept anything, so
/// `Schema::default()` accepts every value. Properties not listed in
/// `properties` are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

/// The JSON type a value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                _ => false,
            },
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

impl Schema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Accepts any value.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    /// An array whose elements all satisfy `items`.
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// A string restricted to the given options.
    pub fn string_enum<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::string().with_enum(options.into_iter().map(|s| Value::String(s.into())))
    }

    /// Restricts the value to one of `values`.
    pub fn with_enum(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    /// Declares a property. Does not make it required.
    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Declares properties that must be present.
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Checks `value` against this schema, reporting the first violation.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.validate_at("/", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), ValidationError> {
        if let Some(expected) = self.schema_type {
            if !expected.matches(value) {
                return Err(ValidationError::new(
                    path,
                    format!("expected {}, got {}", expected.name(), json_type_name(value)),
                ));
            }
        }

        if let Some(options) = &self.enum_values {
            if !options.contains(value) {
                return Err(ValidationError::new(
                    path,
                    format!("{value} is not one of {}", Value::Array(options.clone())),
                ));
            }
        }

        if let Value::Object(map) = value {
            for name in &self.required {
                if !map.contains_key(name) {
                    return Err(ValidationError::new(
                        path,
                        format!("missing required property '{name}'"),
                    ));
                }
            }
            for (name, property) in &self.properties {
                if let Some(child) = map.get(name) {
                    property.validate_at(&child_path(path, name), child)?;
                }
            }
        }

        if let (Value::Array(elements), Some(items)) = (value, &self.items) {
            for (index, element) in elements.iter().enumerate() {
                items.validate_at(&child_path(path, &index.to_string()), element)?;
            }
        }

        Ok(())
    }
}

fn child_path(parent: &str, segment: &str) -> String {
    if parent == "/" {
        format!("/{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
