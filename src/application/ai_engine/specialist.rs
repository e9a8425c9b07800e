//! Specialist generators.
//!
//! A specialist is a rubric plus a strict output schema. It always requests
//! schema-constrained JSON, then validates shape, deserializes into its typed
//! output and checks the output's contract. Calculation specialists also
//! refuse prompts that plainly lack their inputs, before or instead of
//! calling the model.

use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::classifier::{strip_code_fence, ConstrainedClassifier};
use super::models::TierModels;
use super::taxonomies::{Sufficiency, SufficiencyCheck};
use crate::domain::conversation::InlineImage;
use crate::domain::payload::{InsufficientInput, OutputSchema, StructuredOutput};
use crate::domain::profile::UserProfile;
use crate::ports::{AIProvider, CompletionRequest, Message, RequestMetadata};

/// Declarative description of one specialist.
#[derive(Debug, Clone)]
pub struct SpecialistSpec {
    /// Human name, e.g. `Beam Design`.
    pub name: String,
    /// Operation tag used for tracing, e.g. `beam_design`.
    pub operation: String,
    /// Role, method and output rules given to the model.
    pub rubric: String,
    pub schema: OutputSchema,
    /// Inputs the prompt must provide; empty for document specialists.
    pub required_inputs: Vec<String>,
    /// Run a sufficiency classification before generating.
    pub preflight: bool,
}

impl SpecialistSpec {
    pub fn new(
        name: impl Into<String>,
        operation: impl Into<String>,
        rubric: impl Into<String>,
        schema: OutputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            rubric: rubric.into(),
            schema,
            required_inputs: Vec::new(),
            preflight: false,
        }
    }

    pub fn requires<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preflight(mut self) -> Self {
        self.preflight = true;
        self
    }

    /// Clarification listing every declared input.
    pub fn insufficient(&self) -> Option<InsufficientInput> {
        InsufficientInput::new(self.name.clone(), self.required_inputs.clone()).ok()
    }
}

/// Everything a specialist needs for one generation.
#[derive(Debug, Clone)]
pub struct SpecialistInput {
    pub prompt: String,
    pub profile: UserProfile,
    /// Extra prompt block, e.g. project context.
    pub context: Option<String>,
    pub images: Vec<InlineImage>,
    pub trace_id: String,
}

impl SpecialistInput {
    pub fn new(prompt: impl Into<String>, profile: UserProfile, trace_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            profile,
            context: None,
            images: Vec::new(),
            trace_id: trace_id.into(),
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_images(mut self, images: Vec<InlineImage>) -> Self {
        self.images = images;
        self
    }
}

/// What a specialist produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialistOutcome<T> {
    Generated(T),
    NeedsInput(InsufficientInput),
}

/// Why a generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No text, or the call timed out.
    EmptyResponse,
    Transport,
    InvalidJson,
    ContractViolation,
}

/// A specialist could not produce a valid payload.
///
/// `raw` holds the model text for logs; it is never part of the message.
#[derive(Debug, Clone, Error)]
#[error("{specialist} failed: {detail}")]
pub struct GenerationFailure {
    pub specialist: String,
    pub reason: FailureReason,
    pub detail: String,
    pub raw: Option<String>,
}

impl GenerationFailure {
    fn new(spec: &SpecialistSpec, reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            specialist: spec.name.clone(),
            reason,
            detail: detail.into(),
            raw: None,
        }
    }

    fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// A specialist reachable through a registry.
#[async_trait]
pub trait SpecialistHandler<T>: Send + Sync {
    fn spec(&self) -> &SpecialistSpec;

    async fn generate(
        &self,
        input: &SpecialistInput,
    ) -> Result<SpecialistOutcome<T>, GenerationFailure>;
}

/// Generation settings shared by specialists.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub timeout: Duration,
    pub temperature: f32,
    pub models: TierModels,
}

/// Schema-driven specialist producing a typed `T`.
pub struct StructuredSpecialist<T> {
    spec: SpecialistSpec,
    provider: Arc<dyn AIProvider>,
    classifier: ConstrainedClassifier,
    settings: GenerationSettings,
    _output: PhantomData<fn() -> T>,
}

impl<T: StructuredOutput> StructuredSpecialist<T> {
    pub fn new(
        spec: SpecialistSpec,
        provider: Arc<dyn AIProvider>,
        classifier: ConstrainedClassifier,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            spec,
            provider,
            classifier,
            settings,
            _output: PhantomData,
        }
    }

    fn system_prompt(&self, input: &SpecialistInput) -> String {
        let mut prompt = format!(
            "{}\n\nDesign standard: {}. Answer in {}.\n\
             Return only JSON matching the response schema. Keep explanations in \
             description fields and equations in formula fields; never mix prose \
             and math in one entry. Every check must cite its clause in \
             standardReference.",
            self.spec.rubric, input.profile.calculation_standard, input.profile.language
        );
        if let Some(ref context) = input.context {
            prompt.push_str("\n\n");
            prompt.push_str(context);
        }
        prompt
    }

    async fn preflight(&self, input: &SpecialistInput) -> Option<InsufficientInput> {
        if self.spec.required_inputs.is_empty() {
            return None;
        }
        if !input.prompt.chars().any(|c| c.is_ascii_digit()) {
            info!(specialist = %self.spec.name, "prompt has no numeric input");
            return self.spec.insufficient();
        }
        if !self.spec.preflight {
            return None;
        }

        let check = SufficiencyCheck::new(
            format!("{}_preflight", self.spec.operation),
            self.spec.required_inputs.clone(),
        );
        let instruction = format!(
            "Decide whether the request gives every input needed for {}: {}. \
             List the inputs that are missing.",
            self.spec.name,
            self.spec.required_inputs.join(", ")
        );
        let fallback = check.fallback();
        match self
            .classifier
            .classify(&check, &instruction, &input.prompt, &input.trace_id, fallback)
            .await
        {
            Sufficiency::Sufficient => None,
            Sufficiency::Missing(missing) => InsufficientInput::new(self.spec.name.clone(), missing).ok(),
        }
    }

    fn parse(&self, raw: &str) -> Result<T, GenerationFailure> {
        let text = strip_code_fence(raw);
        let value: Value = serde_json::from_str(text).map_err(|e| {
            GenerationFailure::new(&self.spec, FailureReason::InvalidJson, e.to_string()).with_raw(raw)
        })?;
        self.spec.schema.validate(&value).map_err(|e| {
            GenerationFailure::new(&self.spec, FailureReason::ContractViolation, e.to_string())
                .with_raw(raw)
        })?;
        let output: T = serde_json::from_value(value).map_err(|e| {
            GenerationFailure::new(&self.spec, FailureReason::ContractViolation, e.to_string())
                .with_raw(raw)
        })?;
        output.check_contract().map_err(|e| {
            GenerationFailure::new(&self.spec, FailureReason::ContractViolation, e.to_string())
                .with_raw(raw)
        })?;
        Ok(output)
    }
}

#[async_trait]
impl<T: StructuredOutput> SpecialistHandler<T> for StructuredSpecialist<T> {
    fn spec(&self) -> &SpecialistSpec {
        &self.spec
    }

    async fn generate(
        &self,
        input: &SpecialistInput,
    ) -> Result<SpecialistOutcome<T>, GenerationFailure> {
        if let Some(insufficient) = self.preflight(input).await {
            return Ok(SpecialistOutcome::NeedsInput(insufficient));
        }

        let mut request =
            CompletionRequest::new(RequestMetadata::new(&input.trace_id, &self.spec.operation))
                .with_system_prompt(self.system_prompt(input))
                .with_messages([Message::user(&input.prompt).with_images(input.images.clone())])
                .with_temperature(self.settings.temperature)
                .with_response_schema(&self.spec.operation, self.spec.schema.to_json_schema());
        if let Some(model) = self.settings.models.for_tier(input.profile.engine_tier) {
            request = request.with_model(model);
        }

        let response = match timeout(self.settings.timeout, self.provider.complete(request)).await {
            Err(_) => {
                return Err(GenerationFailure::new(
                    &self.spec,
                    FailureReason::EmptyResponse,
                    format!("timed out after {:?}", self.settings.timeout),
                ))
            }
            Ok(Err(err)) => {
                return Err(GenerationFailure::new(
                    &self.spec,
                    FailureReason::Transport,
                    err.to_string(),
                ))
            }
            Ok(Ok(response)) => response,
        };

        if response.content.trim().is_empty() {
            return Err(GenerationFailure::new(
                &self.spec,
                FailureReason::EmptyResponse,
                "model returned no text",
            ));
        }

        match self.parse(&response.content) {
            Ok(output) => {
                debug!(specialist = %self.spec.name, "structured output accepted");
                Ok(SpecialistOutcome::Generated(output))
            }
            Err(failure) => {
                warn!(specialist = %self.spec.name, detail = %failure.detail, "structured output rejected");
                debug!(specialist = %self.spec.name, raw = ?failure.raw, "rejected model text");
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::engine::EngineTier;
    use crate::domain::payload::{fixtures::beam_result_json, CalculationResult};

    fn beam_spec() -> SpecialistSpec {
        SpecialistSpec::new(
            "Beam Design",
            "beam_design",
            "You are a structural engineer designing beams.",
            CalculationResult::output_schema("beam_design"),
        )
        .requires(["span", "loads", "material"])
        .with_preflight()
    }

    fn specialist(provider: &MockAIProvider, spec: SpecialistSpec) -> StructuredSpecialist<CalculationResult> {
        let provider: Arc<dyn AIProvider> = Arc::new(provider.clone());
        StructuredSpecialist::new(
            spec,
            provider.clone(),
            ConstrainedClassifier::new(provider, Duration::from_secs(1)),
            GenerationSettings {
                timeout: Duration::from_millis(300),
                temperature: 0.2,
                models: TierModels {
                    premium: Some("gpt-4o".into()),
                    ..TierModels::default()
                },
            },
        )
    }

    fn input(prompt: &str) -> SpecialistInput {
        SpecialistInput::new(
            prompt,
            UserProfile::new("English", "Eurocode", EngineTier::Premium),
            "trace",
        )
    }

    #[tokio::test]
    async fn numeric_free_prompt_needs_input_without_model_call() {
        let provider = MockAIProvider::new();
        let outcome = specialist(&provider, beam_spec())
            .generate(&input("design a beam"))
            .await
            .unwrap();

        match outcome {
            SpecialistOutcome::NeedsInput(needs) => {
                assert_eq!(needs.missing(), ["span", "loads", "material"]);
                assert_eq!(needs.specialist(), "Beam Design");
            }
            other => panic!("expected NeedsInput, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn preflight_reports_missing_inputs() {
        let provider = MockAIProvider::new()
            .with_operation_response("beam_design_preflight", r#"{"sufficient":false,"missing":["material"]}"#);
        let outcome = specialist(&provider, beam_spec())
            .generate(&input("design a 6 m beam for 25 kN/m"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SpecialistOutcome::NeedsInput(
                InsufficientInput::new("Beam Design", vec!["material".into()]).unwrap()
            )
        );
        assert_eq!(provider.operations(), vec!["beam_design_preflight"]);
    }

    #[tokio::test]
    async fn generates_validated_payload_with_schema_request() {
        let provider = MockAIProvider::new()
            .with_operation_response("beam_design_preflight", r#"{"sufficient":true,"missing":[]}"#)
            .with_operation_response("beam_design", beam_result_json().to_string());
        let outcome = specialist(&provider, beam_spec())
            .generate(&input("design a 6 m C30 beam for 25 kN/m"))
            .await
            .unwrap();

        let SpecialistOutcome::Generated(result) = outcome else {
            panic!("expected generated payload");
        };
        assert_eq!(result.governing_standard, "Eurocode 2");

        let call = &provider.get_calls()[1];
        assert_eq!(call.temperature, Some(0.2));
        assert_eq!(call.model.as_deref(), Some("gpt-4o"));
        assert_eq!(call.response_schema.as_ref().map(|s| s.name.as_str()), Some("beam_design"));
        assert!(call.system_prompt.as_deref().unwrap_or_default().contains("Eurocode"));
    }

    #[tokio::test]
    async fn empty_response_fails() {
        let provider = MockAIProvider::new().with_response("   ");
        let spec = beam_spec();
        let spec = SpecialistSpec { preflight: false, ..spec };
        let err = specialist(&provider, spec)
            .generate(&input("6 m span"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FailureReason::EmptyResponse);
        assert_eq!(err.specialist, "Beam Design");
    }

    #[tokio::test]
    async fn timeout_counts_as_empty_response() {
        let provider = MockAIProvider::new()
            .with_response(beam_result_json().to_string())
            .with_delay(Duration::from_secs(2));
        let spec = SpecialistSpec { preflight: false, ..beam_spec() };
        let err = specialist(&provider, spec)
            .generate(&input("6 m span"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FailureReason::EmptyResponse);
    }

    #[tokio::test]
    async fn transport_error_fails() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
        let spec = SpecialistSpec { preflight: false, ..beam_spec() };
        let err = specialist(&provider, spec)
            .generate(&input("6 m span"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FailureReason::Transport);
    }

    #[tokio::test]
    async fn invalid_json_keeps_raw_out_of_message() {
        let provider = MockAIProvider::new().with_response("{\"governingStandard\": ");
        let spec = SpecialistSpec { preflight: false, ..beam_spec() };
        let err = specialist(&provider, spec)
            .generate(&input("6 m span"))
            .await
            .unwrap_err();
        assert_eq!(err.reason, FailureReason::InvalidJson);
        assert_eq!(err.raw.as_deref(), Some("{\"governingStandard\": "));
        assert!(!err.to_string().contains("governingStandard"));
    }

    #[tokio::test]
    async fn missing_field_and_empty_reference_violate_contract() {
        let mut missing = beam_result_json();
        missing.as_object_mut().unwrap().remove("conclusion");
        let mut blank = beam_result_json();
        blank["verifications"][0]["standardReference"] = "".into();

        for body in [missing, blank] {
            let provider = MockAIProvider::new().with_response(body.to_string());
            let spec = SpecialistSpec { preflight: false, ..beam_spec() };
            let err = specialist(&provider, spec)
                .generate(&input("6 m span"))
                .await
                .unwrap_err();
            assert_eq!(err.reason, FailureReason::ContractViolation);
        }
    }
}
