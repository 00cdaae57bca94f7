//! Declared parameter schemas and argument validation.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a tool's successful payload, reported alongside its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Record,
    RecordList,
    Deletion,
    PackageListing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamField {
    pub name: String,
    pub kind: ParamType,
    pub required: bool,
    pub description: String,
}

/// Ordered set of named, typed parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSchema {
    fields: Vec<ParamField>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, kind: ParamType, description: &str) -> Self {
        self.field(name, kind, true, description)
    }

    pub fn optional(self, name: &str, kind: ParamType, description: &str) -> Self {
        self.field(name, kind, false, description)
    }

    fn field(mut self, name: &str, kind: ParamType, required: bool, description: &str) -> Self {
        self.fields.push(ParamField {
            name: name.to_string(),
            kind,
            required,
            description: description.to_string(),
        });
        self
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ParamField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// JSON Schema object advertised to clients.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                json!({"type": field.kind.as_str(), "description": field.description}),
            );
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    /// Rejects empty or repeated field names.
    pub fn check_well_formed(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err("parameter with empty name".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("parameter '{}' declared twice", field.name));
            }
        }
        Ok(())
    }

    /// Validates raw arguments and returns them as an object with null
    /// optional fields removed. Reports every offending field, not just the first.
    pub fn validate(&self, arguments: &Value) -> Result<Value, Vec<FieldError>> {
        let empty = Map::new();
        let object = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(vec![FieldError::NotAnObject {
                    found: json_type(other),
                }])
            }
        };

        let mut errors = Vec::new();
        let mut normalized = Map::new();

        for (key, value) in object {
            match self.get(key) {
                None => errors.push(FieldError::Unknown { field: key.clone() }),
                Some(field) if value.is_null() && !field.required => {}
                Some(field) if !field.kind.accepts(value) => errors.push(FieldError::WrongType {
                    field: key.clone(),
                    expected: field.kind,
                    found: json_type(value),
                }),
                Some(_) => {
                    normalized.insert(key.clone(), value.clone());
                }
            }
        }

        for field in self.fields.iter().filter(|f| f.required) {
            if !object.contains_key(&field.name) {
                errors.push(FieldError::Missing {
                    field: field.name.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(errors)
        }
    }
}

/// One argument problem found by [`ParamSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum FieldError {
    NotAnObject {
        found: &'static str,
    },
    Unknown {
        field: String,
    },
    Missing {
        field: String,
    },
    WrongType {
        field: String,
        expected: ParamType,
        found: &'static str,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NotAnObject { found } => {
                write!(f, "arguments must be an object, got {}", found)
            }
            FieldError::Unknown { field } => write!(f, "unknown field '{}'", field),
            FieldError::Missing { field } => write!(f, "missing required field '{}'", field),
            FieldError::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field '{}' must be {}, got {}", field, expected, found),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
