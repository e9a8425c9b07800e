//! Site image analysis output.

use serde::{Deserialize, Serialize};

use super::schema::{FieldType, OutputSchema, SchemaField, SchemaViolation};
use super::StructuredOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const VALUES: [&'static str; 4] = ["LOW", "MEDIUM", "HIGH", "CRITICAL"];
}

/// One observation on a site photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: String,
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
    pub standard_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub summary: String,
    pub overall_risk: Severity,
    pub findings: Vec<Finding>,
}

impl AnalysisSummary {
    pub fn output_schema() -> OutputSchema {
        let finding = FieldType::Object(vec![
            SchemaField::required("category", FieldType::String)
                .describe("Hazard or quality category, e.g. Working at height"),
            SchemaField::required("description", FieldType::String),
            SchemaField::required("severity", FieldType::enumeration(Severity::VALUES)),
            SchemaField::required("recommendation", FieldType::String),
            SchemaField::required("standardReference", FieldType::String),
        ]);
        OutputSchema::new(
            "site_image_analysis",
            vec![
                SchemaField::required("summary", FieldType::String),
                SchemaField::required("overallRisk", FieldType::enumeration(Severity::VALUES)),
                SchemaField::required("findings", FieldType::array_of(finding)),
            ],
        )
    }

    /// Highest severity among the findings.
    pub fn worst_finding(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    pub fn digest(&self) -> String {
        format!(
            "[Site analysis: {:?} risk, {} findings] {}",
            self.overall_risk,
            self.findings.len(),
            self.summary
        )
    }
}

impl StructuredOutput for AnalysisSummary {
    fn check_contract(&self) -> Result<(), SchemaViolation> {
        for (i, finding) in self.findings.iter().enumerate() {
            if finding.standard_reference.trim().is_empty() {
                return Err(SchemaViolation::EmptyValue {
                    field: format!("findings[{}].standardReference", i),
                });
            }
        }
        Ok(())
    }
}
