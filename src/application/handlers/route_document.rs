//! RouteDocumentHandler - Generate a compliance document for one role

use std::collections::HashMap;
use thiserror::Error;

use crate::application::ai_engine::{
    DispatchError, GenerationFailure, SpecialistInput, SpecialistOutcome, SpecialistRegistry,
    SubtaskDetector,
};
use crate::domain::engine::{Capability, CapabilityDenied, CapabilityGate};
use crate::domain::payload::{DocumentPayload, DocumentResult, InsufficientInput};
use crate::domain::profile::{ProjectContext, UserProfile};
use crate::domain::tasks::{DocumentKind, DocumentRole, TaskTag};

/// Command to generate a document
#[derive(Debug, Clone)]
pub struct RouteDocumentCommand {
    pub prompt: String,
    pub role: DocumentRole,
    /// Document type suggested by intent detection.
    pub hint: Option<DocumentKind>,
    pub profile: UserProfile,
    pub project_context: Option<ProjectContext>,
    pub trace_id: String,
}

/// Error type for document routing
#[derive(Debug, Clone, Error)]
pub enum RouteDocumentError {
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error("no {0} document matches this request")]
    UnsupportedTask(DocumentRole),

    #[error("{} needs more detail: {}", .0.specialist(), .0.missing().join(", "))]
    NeedsInput(InsufficientInput),

    #[error(transparent)]
    GenerationFailure(#[from] GenerationFailure),
}

/// Handler for the site manager, HSE and quality agents
pub struct RouteDocumentHandler {
    gate: CapabilityGate,
    detector: SubtaskDetector,
    registries: HashMap<DocumentRole, SpecialistRegistry<DocumentKind, DocumentResult>>,
}

impl RouteDocumentHandler {
    pub fn new(
        detector: SubtaskDetector,
        registries: HashMap<DocumentRole, SpecialistRegistry<DocumentKind, DocumentResult>>,
    ) -> Self {
        Self {
            gate: CapabilityGate,
            detector,
            registries,
        }
    }

    pub async fn handle(
        &self,
        cmd: RouteDocumentCommand,
    ) -> Result<DocumentPayload, RouteDocumentError> {
        self.gate
            .check(Capability::DocumentGeneration, cmd.profile.engine_tier)?;
        let registry = self
            .registries
            .get(&cmd.role)
            .ok_or(RouteDocumentError::UnsupportedTask(cmd.role))?;

        let hint = cmd.hint.filter(|kind| kind.role() == cmd.role);
        let selection = self
            .detector
            .detect(
                cmd.role.tag(),
                DocumentKind::for_role(cmd.role),
                &cmd.prompt,
                hint,
                &cmd.trace_id,
            )
            .await;

        let context = cmd.project_context.as_ref().and_then(ProjectContext::to_prompt_block);
        let input = SpecialistInput::new(cmd.prompt, cmd.profile.clone(), cmd.trace_id)
            .with_context(context);

        let (kind, outcome) = registry
            .dispatch(selection, cmd.profile.engine_tier, &input)
            .await
            .map_err(|err| match err {
                DispatchError::UnsupportedTask => RouteDocumentError::UnsupportedTask(cmd.role),
                DispatchError::CapabilityDenied(denied) => denied.into(),
                DispatchError::GenerationFailure(failure) => failure.into(),
            })?;

        match outcome {
            SpecialistOutcome::Generated(result) => Ok(DocumentPayload {
                task: kind.label().to_string(),
                result,
            }),
            SpecialistOutcome::NeedsInput(needs) => Err(RouteDocumentError::NeedsInput(needs)),
        }
    }
}
