//! Compliance document specialists for the site manager, HSE and quality
//! agents.
//!
//! Every schema pins `resultType` to the kind's own discriminator, so a
//! payload of another kind fails validation.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::application::ai_engine::{
    ConstrainedClassifier, GenerationSettings, SpecialistRegistry, SpecialistSpec,
    StructuredSpecialist,
};
use crate::domain::engine::{Capability, EngineTier};
use crate::domain::payload::{DocumentResult, FieldType, OutputSchema, SchemaField, Severity};
use crate::domain::tasks::{DocumentKind, DocumentRole, TaskTag};
use crate::ports::AIProvider;

fn text(name: &str) -> SchemaField {
    SchemaField::required(name, FieldType::String)
}

fn list(name: &str) -> SchemaField {
    SchemaField::required(name, FieldType::array_of(FieldType::String))
}

fn rows(name: &str, columns: &[&str]) -> SchemaField {
    SchemaField::required(
        name,
        FieldType::array_of(FieldType::Object(columns.iter().map(|c| text(c)).collect())),
    )
}

fn hazards() -> SchemaField {
    SchemaField::required(
        "hazards",
        FieldType::array_of(FieldType::Object(vec![
            text("hazard"),
            text("consequence"),
            SchemaField::required("riskLevel", FieldType::enumeration(Severity::VALUES)),
            text("controls"),
            text("responsible"),
        ])),
    )
}

fn body(kind: DocumentKind) -> (&'static str, Vec<SchemaField>) {
    match kind {
        DocumentKind::DailySiteReport => (
            "Record the day's site activity for the project file.",
            vec![
                text("date"),
                text("weather"),
                rows("workforce", &["trade", "count"]),
                list("activities"),
                list("equipment"),
                list("issues"),
            ],
        ),
        DocumentKind::ProgressReport => (
            "Report progress against programme for the reporting period.",
            vec![
                text("period"),
                rows("milestones", &["milestone", "status", "forecast"]),
                list("delays"),
                list("nextSteps"),
            ],
        ),
        DocumentKind::MaterialRequisition => (
            "Prepare a material requisition ready for procurement.",
            vec![
                rows("items", &["description", "quantity", "unit", "specification"]),
                text("requiredBy"),
                text("deliveryLocation"),
            ],
        ),
        DocumentKind::LookAheadSchedule => (
            "Plan the coming weeks of work with constraints cleared in advance.",
            vec![
                text("horizon"),
                rows("activities", &["activity", "start", "finish", "crew"]),
                list("constraints"),
            ],
        ),
        DocumentKind::RiskAssessment => (
            "Assess the risks of the described work and set controls.",
            vec![text("activity"), hazards(), list("ppe"), text("residualRisk")],
        ),
        DocumentKind::JobSafetyAnalysis => (
            "Break the job into steps and set controls for each step's hazards.",
            vec![
                text("job"),
                rows("steps", &["step", "hazard", "control"]),
                list("ppe"),
            ],
        ),
        DocumentKind::IncidentReport => (
            "Report the incident factually and identify causes and corrective actions.",
            vec![
                text("dateTime"),
                text("location"),
                text("description"),
                list("immediateCauses"),
                list("rootCauses"),
                list("correctiveActions"),
            ],
        ),
        DocumentKind::ToolboxTalk => (
            "Write a short toolbox talk for the crew.",
            vec![text("topic"), list("keyPoints"), list("discussionQuestions")],
        ),
        DocumentKind::PermitToWork => (
            "Draft a permit to work with isolations and precautions.",
            vec![
                text("workDescription"),
                text("permitType"),
                text("validity"),
                list("isolations"),
                list("precautions"),
                hazards(),
            ],
        ),
        DocumentKind::InspectionTestPlan => (
            "Draft an inspection and test plan with hold and witness points.",
            vec![
                text("scope"),
                rows(
                    "inspections",
                    &["activity", "criteria", "method", "frequency", "pointType", "record"],
                ),
            ],
        ),
        DocumentKind::NonConformanceReport => (
            "Raise a non-conformance report with disposition and corrective action.",
            vec![
                text("description"),
                text("requirement"),
                text("rootCause"),
                text("disposition"),
                list("correctiveActions"),
            ],
        ),
        DocumentKind::QualityChecklist => (
            "Prepare a quality checklist for the described element.",
            vec![
                text("element"),
                rows("checks", &["item", "acceptanceCriteria", "reference"]),
            ],
        ),
        DocumentKind::MethodStatement => (
            "Write a method statement for the described work.",
            vec![
                text("scope"),
                list("resources"),
                rows("sequence", &["step", "description"]),
                list("qualityControls"),
                list("safetyControls"),
            ],
        ),
    }
}

static SCHEMAS: Lazy<HashMap<DocumentKind, OutputSchema>> = Lazy::new(|| {
    DocumentKind::all()
        .iter()
        .map(|kind| (*kind, build_schema(*kind)))
        .collect()
});

/// Output schema for `kind`, pinned to its `resultType`.
pub fn schema(kind: DocumentKind) -> OutputSchema {
    SCHEMAS
        .get(&kind)
        .cloned()
        .unwrap_or_else(|| build_schema(kind))
}

fn build_schema(kind: DocumentKind) -> OutputSchema {
    let (_, fields) = body(kind);
    let mut all = vec![
        SchemaField::required("resultType", FieldType::enumeration([kind.result_type()])),
        text(DocumentResult::SUMMARY_FIELD).describe("One-sentence overview of the document"),
    ];
    all.extend(fields);
    OutputSchema::new(kind.tag(), all)
}

pub fn spec(kind: DocumentKind) -> SpecialistSpec {
    let (purpose, _) = body(kind);
    let author = kind.role().display_name();
    SpecialistSpec::new(
        kind.label(),
        kind.tag(),
        format!(
            "You are an experienced {author} preparing a {label}.\n{purpose}\n\
             Fill every field with site-ready content; where the request lacks a \
             detail, write a clear placeholder for the user to complete. Set \
             resultType to {result_type}.",
            label = kind.label(),
            result_type = kind.result_type()
        ),
        schema(kind),
    )
}

/// Registry for the documents of one role.
pub fn registry(
    role: DocumentRole,
    provider: Arc<dyn AIProvider>,
    classifier: &ConstrainedClassifier,
    settings: &GenerationSettings,
) -> SpecialistRegistry<DocumentKind, DocumentResult> {
    let mut registry = SpecialistRegistry::new(role.tag(), Capability::DocumentGeneration);
    for kind in DocumentKind::for_role(role) {
        registry.register(
            kind,
            EngineTier::Compact,
            Arc::new(StructuredSpecialist::<DocumentResult>::new(
                spec(kind),
                provider.clone(),
                classifier.clone(),
                settings.clone(),
            )),
        );
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_type_is_pinned() {
        let schema = schema(DocumentKind::DailySiteReport);
        let json = schema.to_json_schema();
        assert_eq!(
            json["properties"]["resultType"]["enum"],
            json!(["DAILY_SITE_REPORT"])
        );

        let wrong = json!({
            "resultType": "PROGRESS_REPORT",
            "summary": "s",
            "date": "d", "weather": "w", "workforce": [], "activities": [],
            "equipment": [], "issues": []
        });
        assert!(schema.validate(&wrong).is_err());
    }

    #[test]
    fn specs_have_no_required_inputs() {
        for kind in DocumentKind::all() {
            let spec = spec(*kind);
            assert!(spec.required_inputs.is_empty());
            assert!(!spec.preflight);
            assert!(spec.schema.required_fields().contains(&"summary"));
        }
    }

    #[test]
    fn role_registries_cover_only_their_kinds() {
        use crate::adapters::ai::MockAIProvider;
        use std::time::Duration;

        let provider: Arc<dyn AIProvider> = Arc::new(MockAIProvider::new());
        let classifier = ConstrainedClassifier::new(provider.clone(), Duration::from_secs(1));
        let settings = GenerationSettings {
            timeout: Duration::from_secs(1),
            temperature: 0.2,
            models: Default::default(),
        };
        let hse = registry(DocumentRole::Hse, provider, &classifier, &settings);
        assert_eq!(hse.len(), 5);
        assert!(hse.get(DocumentKind::PermitToWork).is_some());
        assert!(hse.get(DocumentKind::DailySiteReport).is_none());
    }
}
