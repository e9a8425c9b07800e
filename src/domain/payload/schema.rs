//! Output schemas for structured generation.
//!
//! A schema is declared once as a tree of [`SchemaField`]s. The same tree is
//! rendered to JSON Schema for the provider's constrained-output mode and
//! walked to validate the parsed response, so the two never drift apart.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Type of a field in an output schema.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// String restricted to a closed set of values.
    Enum(Vec<String>),
    Array(Box<FieldType>),
    Object(Vec<SchemaField>),
}

impl FieldType {
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array_of(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    fn to_json_schema(&self) -> Value {
        match self {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Number => json!({ "type": "number" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Enum(values) => json!({ "type": "string", "enum": values }),
            FieldType::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
            FieldType::Object(fields) => object_schema(fields),
        }
    }
}

/// A named field in an output schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: String,
}

impl SchemaField {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Top-level object schema of a specialist's output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Names of required top-level fields.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Renders the schema as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        object_schema(&self.fields)
    }

    /// Checks presence, type and enum membership of every declared field.
    ///
    /// Undeclared fields are tolerated.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        validate_object(&self.fields, value, "root")
    }
}

fn object_schema(fields: &[SchemaField]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        let mut property = field.field_type.to_json_schema();
        if !field.description.is_empty() {
            if let Some(obj) = property.as_object_mut() {
                obj.insert("description".into(), Value::String(field.description.clone()));
            }
        }
        properties.insert(field.name.clone(), property);
    }
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Shape violation found while validating generated output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid type for field {field}: expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field {field} must be one of {allowed:?}, got '{actual}'")]
    NotInEnum {
        field: String,
        allowed: Vec<String>,
        actual: String,
    },

    #[error("Field {field} must not be empty")]
    EmptyValue { field: String },
}

fn path_of(parent: &str, field: &str) -> String {
    if parent == "root" {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

fn invalid_type(path: &str, expected: &str, value: &Value) -> SchemaViolation {
    SchemaViolation::InvalidType {
        field: path.to_string(),
        expected: expected.to_string(),
        actual: type_name(value),
    }
}

fn validate_object(fields: &[SchemaField], value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid_type(path, "object", value))?;

    for field in fields {
        let field_path = path_of(path, &field.name);
        match obj.get(&field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(SchemaViolation::MissingRequired { field: field_path });
            }
            None | Some(Value::Null) => {}
            Some(v) => validate_value(&field.field_type, v, &field_path)?,
        }
    }
    Ok(())
}

fn validate_value(field_type: &FieldType, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    match field_type {
        FieldType::String if value.is_string() => Ok(()),
        FieldType::String => Err(invalid_type(path, "string", value)),
        FieldType::Number if value.is_number() => Ok(()),
        FieldType::Number => Err(invalid_type(path, "number", value)),
        FieldType::Boolean if value.is_boolean() => Ok(()),
        FieldType::Boolean => Err(invalid_type(path, "boolean", value)),
        FieldType::Enum(allowed) => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid_type(path, "string", value))?;
            if allowed.iter().any(|a| a == s) {
                Ok(())
            } else {
                Err(SchemaViolation::NotInEnum {
                    field: path.to_string(),
                    allowed: allowed.clone(),
                    actual: s.to_string(),
                })
            }
        }
        FieldType::Array(item) => {
            let arr = value
                .as_array()
                .ok_or_else(|| invalid_type(path, "array", value))?;
            for (i, element) in arr.iter().enumerate() {
                validate_value(item, element, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        FieldType::Object(fields) => validate_object(fields, value, path),
    }
}
