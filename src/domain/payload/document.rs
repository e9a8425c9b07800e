//! Structured compliance document output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::SchemaViolation;
use super::StructuredOutput;
use crate::domain::tasks::DocumentKind;

/// Body of a generated document: the `resultType` discriminator plus the
/// kind-specific fields, flattened into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub result_type: DocumentKind,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DocumentResult {
    /// Field every document kind carries, used for history digests.
    pub const SUMMARY_FIELD: &'static str = "summary";

    pub fn summary(&self) -> Option<&str> {
        self.fields.get(Self::SUMMARY_FIELD).and_then(Value::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl StructuredOutput for DocumentResult {
    fn check_contract(&self) -> Result<(), SchemaViolation> {
        match self.summary() {
            Some(s) if !s.trim().is_empty() => Ok(()),
            _ => Err(SchemaViolation::EmptyValue {
                field: Self::SUMMARY_FIELD.to_string(),
            }),
        }
    }
}

/// A generated document labelled with its task name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub task: String,
    pub result: DocumentResult,
}

impl DocumentPayload {
    pub fn kind(&self) -> DocumentKind {
        self.result.result_type
    }

    pub fn digest(&self) -> String {
        format!(
            "[Document: {}] {}",
            self.task,
            self.result.summary().unwrap_or_default()
        )
    }
}
