//! Structured payloads produced by specialist generators.

mod analysis;
mod calculation;
mod document;
mod outcome;
mod schema;

pub use analysis::{AnalysisSummary, Finding, Severity};
pub use calculation::{
    CalculationPayload, CalculationResult, CalculationStep, Conclusion, FinalAnswer, GivenValue,
    Verification, VerificationStatus,
};
pub use document::{DocumentPayload, DocumentResult};
pub use outcome::InsufficientInput;
pub use schema::{FieldType, OutputSchema, SchemaField, SchemaViolation};

#[cfg(test)]
pub(crate) use calculation::fixtures;

use serde::de::DeserializeOwned;

/// A typed specialist output with semantic checks beyond its JSON shape.
pub trait StructuredOutput: DeserializeOwned + Send + Sync + 'static {
    /// Checks rules the schema alone cannot express.
    fn check_contract(&self) -> Result<(), SchemaViolation>;
}
