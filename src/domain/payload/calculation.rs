//! Structured engineering calculation output.

use serde::{Deserialize, Serialize};

use super::schema::{FieldType, OutputSchema, SchemaField, SchemaViolation};
use super::StructuredOutput;

/// Outcome of a single code check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Ok,
    Fail,
    Warning,
}

impl VerificationStatus {
    pub const VALUES: [&'static str; 3] = ["OK", "FAIL", "WARNING"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GivenValue {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
}

/// One derivation step. Prose stays in `description`, math in `formula`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationStep {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub check: String,
    pub status: VerificationStatus,
    pub standard_reference: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalAnswer {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conclusion {
    pub summary: String,
    pub final_answer: FinalAnswer,
}

/// Body of a calculation returned by a structural or geotechnical specialist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub governing_standard: String,
    pub problem_statement: String,
    pub assumptions: Vec<String>,
    pub given_data: Vec<GivenValue>,
    pub calculation_steps: Vec<CalculationStep>,
    pub verifications: Vec<Verification>,
    pub conclusion: Conclusion,
}

impl CalculationResult {
    /// Shared output schema of every calculation specialist.
    pub fn output_schema(name: impl Into<String>) -> OutputSchema {
        let given = FieldType::Object(vec![
            SchemaField::required("name", FieldType::String),
            SchemaField::required("value", FieldType::String),
            SchemaField::required("unit", FieldType::String),
        ]);
        let step = FieldType::Object(vec![
            SchemaField::required("title", FieldType::String),
            SchemaField::required("description", FieldType::String)
                .describe("Plain-language explanation, no equations"),
            SchemaField::required("formula", FieldType::String)
                .describe("Equation with substituted values, no prose"),
            SchemaField::required("result", FieldType::String),
        ]);
        let verification = FieldType::Object(vec![
            SchemaField::required("check", FieldType::String),
            SchemaField::required(
                "status",
                FieldType::enumeration(VerificationStatus::VALUES),
            ),
            SchemaField::required("standardReference", FieldType::String)
                .describe("Clause of the governing standard"),
            SchemaField::required("details", FieldType::String),
        ]);
        let conclusion = FieldType::Object(vec![
            SchemaField::required("summary", FieldType::String),
            SchemaField::required(
                "finalAnswer",
                FieldType::Object(vec![
                    SchemaField::required("name", FieldType::String),
                    SchemaField::required("value", FieldType::String),
                    SchemaField::required("unit", FieldType::String),
                ]),
            ),
        ]);

        OutputSchema::new(
            name,
            vec![
                SchemaField::required("governingStandard", FieldType::String),
                SchemaField::required("problemStatement", FieldType::String),
                SchemaField::required("assumptions", FieldType::array_of(FieldType::String)),
                SchemaField::required("givenData", FieldType::array_of(given)),
                SchemaField::required("calculationSteps", FieldType::array_of(step)),
                SchemaField::required("verifications", FieldType::array_of(verification)),
                SchemaField::required("conclusion", conclusion),
            ],
        )
    }

    /// `true` when no verification failed.
    pub fn passes(&self) -> bool {
        self.verifications
            .iter()
            .all(|v| v.status != VerificationStatus::Fail)
    }
}

impl StructuredOutput for CalculationResult {
    fn check_contract(&self) -> Result<(), SchemaViolation> {
        for (i, verification) in self.verifications.iter().enumerate() {
            if verification.standard_reference.trim().is_empty() {
                return Err(SchemaViolation::EmptyValue {
                    field: format!("verifications[{}].standardReference", i),
                });
            }
        }
        Ok(())
    }
}

/// A calculation labelled with the task that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationPayload {
    pub task: String,
    pub result: CalculationResult,
}

impl CalculationPayload {
    /// One-line digest used when the payload is replayed as history.
    pub fn digest(&self) -> String {
        let answer = &self.result.conclusion.final_answer;
        let value = if answer.unit.is_empty() {
            answer.value.clone()
        } else {
            format!("{} {}", answer.value, answer.unit)
        };
        format!(
            "[Calculation: {}] {} = {} ({})",
            self.task, answer.name, value, self.result.governing_standard
        )
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::beam_result_json;
    use super::*;

    #[test]
    fn fixture_satisfies_schema_and_contract() {
        let value = beam_result_json();
        CalculationResult::output_schema("beam_design")
            .validate(&value)
            .unwrap();
        let result: CalculationResult = serde_json::from_value(value).unwrap();
        assert!(result.check_contract().is_ok());
        assert!(result.passes());
    }

    #[test]
    fn empty_standard_reference_breaks_contract() {
        let mut value = beam_result_json();
        value["verifications"][0]["standardReference"] = "  ".into();
        let result: CalculationResult = serde_json::from_value(value).unwrap();
        assert_eq!(
            result.check_contract(),
            Err(SchemaViolation::EmptyValue {
                field: "verifications[0].standardReference".into()
            })
        );
    }

    #[test]
    fn unknown_status_fails_schema() {
        let mut value = beam_result_json();
        value["verifications"][0]["status"] = "PASS".into();
        assert!(CalculationResult::output_schema("beam_design")
            .validate(&value)
            .is_err());
    }

    #[test]
    fn digest_names_task_and_answer() {
        let payload = CalculationPayload {
            task: "Beam Design".into(),
            result: serde_json::from_value(beam_result_json()).unwrap(),
        };
        assert_eq!(
            payload.digest(),
            "[Calculation: Beam Design] Required steel = 942 mm2 (Eurocode 2)"
        );
    }
}
