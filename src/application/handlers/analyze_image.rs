//! Site photo handlers: structured hazard analysis and the visual co-pilot.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::stream_conversation::{
    conversation_messages, open_stream, StreamConversationResult, StreamError,
};
use crate::application::ai_engine::{
    ConstrainedClassifier, GenerationFailure, GenerationSettings, SpecialistHandler,
    SpecialistInput, SpecialistOutcome, StreamingChannel, StructuredSpecialist, TierModels,
};
use crate::application::catalog::visual;
use crate::domain::conversation::{ConversationMessage, HistoryBuilder, InlineImage};
use crate::domain::engine::{Capability, CapabilityDenied, CapabilityGate};
use crate::domain::payload::{AnalysisSummary, InsufficientInput};
use crate::domain::profile::UserProfile;
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

/// Command to analyze site photos
#[derive(Debug, Clone)]
pub struct AnalyzeImageCommand {
    pub prompt: String,
    pub images: Vec<InlineImage>,
    pub profile: UserProfile,
    pub trace_id: String,
}

/// Error type for image analysis
#[derive(Debug, Clone, Error)]
pub enum AnalyzeImageError {
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error("no image was attached")]
    NoImage,

    #[error("{} needs more detail: {}", .0.specialist(), .0.missing().join(", "))]
    NeedsInput(InsufficientInput),

    #[error(transparent)]
    GenerationFailure(#[from] GenerationFailure),
}

/// Handler for the analysis agent
pub struct AnalyzeImageHandler {
    gate: CapabilityGate,
    specialist: StructuredSpecialist<AnalysisSummary>,
}

impl AnalyzeImageHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        classifier: ConstrainedClassifier,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            gate: CapabilityGate,
            specialist: StructuredSpecialist::new(visual::analysis_spec(), provider, classifier, settings),
        }
    }

    pub async fn handle(&self, cmd: AnalyzeImageCommand) -> Result<AnalysisSummary, AnalyzeImageError> {
        self.gate
            .check(Capability::ImageAnalysis, cmd.profile.engine_tier)?;
        if cmd.images.is_empty() {
            return Err(AnalyzeImageError::NoImage);
        }

        let input = SpecialistInput::new(cmd.prompt, cmd.profile, cmd.trace_id).with_images(cmd.images);
        match self.specialist.generate(&input).await? {
            SpecialistOutcome::Generated(summary) => Ok(summary),
            SpecialistOutcome::NeedsInput(needs) => Err(AnalyzeImageError::NeedsInput(needs)),
        }
    }
}

/// Command for a free-form question about photos
#[derive(Debug, Clone)]
pub struct VisualFollowUpCommand {
    pub prompt: String,
    pub images: Vec<InlineImage>,
    pub history: Vec<ConversationMessage>,
    pub profile: UserProfile,
    pub trace_id: String,
}

/// Handler for the co-pilot agent
pub struct VisualFollowUpHandler {
    provider: Arc<dyn AIProvider>,
    gate: CapabilityGate,
    history: HistoryBuilder,
    temperature: f32,
    models: TierModels,
    timeout: Duration,
}

impl VisualFollowUpHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        history: HistoryBuilder,
        temperature: f32,
        models: TierModels,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            gate: CapabilityGate,
            history,
            temperature,
            models,
            timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: VisualFollowUpCommand,
    ) -> Result<StreamConversationResult, StreamError> {
        let tier = cmd.profile.engine_tier;
        self.gate.check(Capability::VisualFollowUp, tier)?;

        let history = self.history.build(&cmd.history);
        let mut request =
            CompletionRequest::new(RequestMetadata::new(&cmd.trace_id, visual::FOLLOW_UP_OPERATION))
                .with_system_prompt(visual::follow_up_instruction(&cmd.profile))
                .with_messages(conversation_messages(&history, &cmd.prompt, cmd.images))
                .with_temperature(self.temperature);
        if let Some(model) = self.models.for_tier(tier) {
            request = request.with_model(model);
        }

        let stream = open_stream(self.provider.as_ref(), request, self.timeout).await?;
        let (channel, cancel) = StreamingChannel::new(stream);
        Ok(StreamConversationResult {
            channel,
            cancel,
            rag: None,
        })
    }
}
