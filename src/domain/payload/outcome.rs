use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Clarification request returned instead of a generated payload when the
/// prompt lacks inputs the specialist needs.
///
/// # Invariants
///
/// - `missing` holds at least one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientInput {
    specialist: String,
    missing: Vec<String>,
}

impl InsufficientInput {
    pub fn new(
        specialist: impl Into<String>,
        missing: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let missing: Vec<String> = missing
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if missing.is_empty() {
            return Err(ValidationError::empty_field("missing"));
        }
        Ok(Self {
            specialist: specialist.into(),
            missing,
        })
    }

    pub fn specialist(&self) -> &str {
        &self.specialist
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}
