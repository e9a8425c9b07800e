//! Orchestrator - Per-turn task routing
//!
//! Owns one handler per domain agent, validates every specialist registry at
//! construction, and runs the full turn pipeline: intent, capability gate,
//! routing, optional retrieval, generation. Handlers return typed outcomes;
//! this is the only place that turns them into user-facing text.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::ai_engine::{
    ConstrainedClassifier, GenerationFailure, GenerationSettings, RagContextInjector,
    RegistryError, StreamState, SubtaskDetector, TierModels,
};
use super::catalog::{documents, geotechnical, structural};
use super::handlers::{
    AnalyzeImageCommand, AnalyzeImageError, AnalyzeImageHandler, CalculationOutcome,
    DetectIntentCommand, DetectIntentHandler, RouteCalculationCommand, RouteCalculationError,
    RouteCalculationHandler, RouteDocumentCommand, RouteDocumentError, RouteDocumentHandler,
    StreamConversationCommand, StreamConversationHandler, StreamConversationResult, StreamError,
    VisualFollowUpCommand, VisualFollowUpHandler,
};
use crate::domain::conversation::{ConversationMessage, HistoryBuilder, InlineImage, MessageContent, UserTurn};
use crate::domain::engine::{Capability, CapabilityDenied};
use crate::domain::intent::Intent;
use crate::domain::payload::{AnalysisSummary, CalculationPayload, DocumentPayload, InsufficientInput};
use crate::domain::pipeline::{TurnPhase, TurnRecord};
use crate::domain::profile::{ProjectContext, UserProfile};
use crate::domain::tasks::{AgentKind, DocumentKind, DocumentRole, GeotechnicalTask, StructuralTask, TaskTag};
use crate::ports::{AIError, AIProvider, DocumentCorpus};

/// Tunables of the orchestration layer.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub classification_timeout: Duration,
    pub generation_timeout: Duration,
    pub context_snippet_chars: usize,
    pub specialist_temperature: f32,
    pub conversation_temperature: f32,
    /// Model for classification calls; `None` keeps the provider default.
    pub classifier_model: Option<String>,
    pub models: TierModels,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            classification_timeout: Duration::from_secs(20),
            generation_timeout: Duration::from_secs(120),
            context_snippet_chars: 500,
            specialist_temperature: 0.2,
            conversation_temperature: 0.7,
            classifier_model: None,
            models: TierModels::default(),
        }
    }
}

/// Why a turn produced no reply.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error("the {0} agent has no specialist for this request")]
    UnsupportedTask(AgentKind),

    #[error(transparent)]
    GenerationFailure(#[from] GenerationFailure),

    #[error("no image was attached")]
    NoImage,

    #[error(transparent)]
    Provider(#[from] AIError),
}

impl TurnError {
    /// Text to show the user in place of a reply.
    pub fn user_message(&self) -> String {
        match self {
            TurnError::CapabilityDenied(denied) => format!(
                "{} needs the {} engine. Your current engine is {}.",
                denied.capability, denied.required, denied.current
            ),
            TurnError::UnsupportedTask(agent) => format!(
                "The {} agent can't handle this request yet. Try rephrasing it or ask a general question.",
                agent
            ),
            TurnError::GenerationFailure(failure) => format!(
                "The {} specialist couldn't produce a valid result. Please try again.",
                failure.specialist
            ),
            TurnError::NoImage => "Attach a site photo to analyze.".to_string(),
            TurnError::Provider(_) => {
                "The assistant is unavailable right now. Please try again in a moment.".to_string()
            }
        }
    }
}

/// Clarification asking for the inputs a specialist is missing.
pub fn clarification(needs: &InsufficientInput) -> String {
    format!(
        "To run the {} calculation I need: {}.",
        needs.specialist(),
        needs.missing().join(", ")
    )
}

/// Successful reply of a turn.
pub enum TurnReply {
    Calculation(CalculationPayload),
    Document(DocumentPayload),
    Analysis(AnalysisSummary),
    NeedsInput(InsufficientInput),
    Streaming(StreamConversationResult),
}

impl TurnReply {
    /// Message content for the caller's transcript; `None` for streams.
    pub fn content(&self) -> Option<MessageContent> {
        match self {
            TurnReply::Calculation(payload) => Some(MessageContent::Calculation(payload.clone())),
            TurnReply::Document(payload) => Some(MessageContent::Document(payload.clone())),
            TurnReply::Analysis(summary) => Some(MessageContent::Analysis(summary.clone())),
            TurnReply::NeedsInput(needs) => Some(MessageContent::text(clarification(needs))),
            TurnReply::Streaming(_) => None,
        }
    }
}

impl std::fmt::Debug for TurnReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnReply::Calculation(p) => f.debug_tuple("Calculation").field(p).finish(),
            TurnReply::Document(p) => f.debug_tuple("Document").field(p).finish(),
            TurnReply::Analysis(s) => f.debug_tuple("Analysis").field(s).finish(),
            TurnReply::NeedsInput(n) => f.debug_tuple("NeedsInput").field(n).finish(),
            TurnReply::Streaming(s) => f.debug_tuple("Streaming").field(s).finish(),
        }
    }
}

/// Everything one turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    pub record: TurnRecord,
    pub intent: Option<Intent>,
    pub agent: AgentKind,
    pub reply: Result<TurnReply, TurnError>,
}

impl TurnOutcome {
    /// Records how the stream of a streaming reply ended.
    pub fn finish_stream(&mut self, state: StreamState) {
        let phase = match state {
            StreamState::Generating => return,
            StreamState::Completed => TurnPhase::Completed,
            StreamState::Failed => TurnPhase::Failed,
            StreamState::Cancelled => TurnPhase::Cancelled,
        };
        advance(&mut self.record, phase);
    }
}

fn advance(record: &mut TurnRecord, phase: TurnPhase) {
    if let Err(err) = record.advance(phase) {
        warn!(turn = %record.id(), error = %err, "turn phase not recorded");
    }
}

fn fail(record: &mut TurnRecord) {
    if record.current() == TurnPhase::RagLookup {
        advance(record, TurnPhase::Generating);
    }
    advance(record, TurnPhase::Failed);
}

fn trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Entry point of the orchestration core.
pub struct Orchestrator {
    intent: DetectIntentHandler,
    structural: RouteCalculationHandler<StructuralTask>,
    geotechnical: RouteCalculationHandler<GeotechnicalTask>,
    documents: RouteDocumentHandler,
    conversation: StreamConversationHandler,
    analysis: AnalyzeImageHandler,
    copilot: VisualFollowUpHandler,
}

impl Orchestrator {
    /// Builds every agent and validates its registry.
    ///
    /// # Errors
    ///
    /// - `MissingHandlers` if any task has no specialist
    pub fn new(
        settings: OrchestratorSettings,
        provider: Arc<dyn AIProvider>,
        corpus: Option<Arc<dyn DocumentCorpus>>,
    ) -> Result<Self, RegistryError> {
        let mut classifier = ConstrainedClassifier::new(provider.clone(), settings.classification_timeout);
        if let Some(ref model) = settings.classifier_model {
            classifier = classifier.with_model(model.clone());
        }
        let detector = SubtaskDetector::new(classifier.clone());
        let generation = GenerationSettings {
            timeout: settings.generation_timeout,
            temperature: settings.specialist_temperature,
            models: settings.models.clone(),
        };
        let history = HistoryBuilder::new(settings.context_snippet_chars);

        let structural = structural::registry(provider.clone(), &classifier, &generation);
        structural.validate_exhaustive()?;
        let geotechnical = geotechnical::registry(provider.clone(), &classifier, &generation);
        geotechnical.validate_exhaustive()?;

        let mut registries = HashMap::new();
        for role in DocumentRole::ALL {
            let registry = documents::registry(role, provider.clone(), &classifier, &generation);
            registry.validate_covers(&DocumentKind::for_role(role))?;
            registries.insert(role, registry);
        }

        let rag = corpus.map(|corpus| {
            Arc::new(
                RagContextInjector::new(
                    classifier.clone(),
                    provider.clone(),
                    corpus,
                    settings.classification_timeout,
                )
                .with_model(settings.models.premium.clone()),
            )
        });

        let provider_info = provider.provider_info();
        info!(
            provider = %provider_info.name,
            model = %provider_info.model,
            vision = provider_info.supports_vision,
            structural = structural.len(),
            geotechnical = geotechnical.len(),
            documents = DocumentKind::all().len(),
            rag = rag.is_some(),
            "orchestrator ready"
        );

        Ok(Self {
            intent: DetectIntentHandler::new(classifier.clone(), history),
            structural: RouteCalculationHandler::new(
                Capability::StructuralCalculation,
                detector.clone(),
                structural,
            ),
            geotechnical: RouteCalculationHandler::new(
                Capability::GeotechnicalCalculation,
                detector.clone(),
                geotechnical,
            ),
            documents: RouteDocumentHandler::new(detector, registries),
            conversation: StreamConversationHandler::new(
                provider.clone(),
                rag,
                history,
                settings.conversation_temperature,
                settings.models.clone(),
                settings.generation_timeout,
            ),
            analysis: AnalyzeImageHandler::new(provider.clone(), classifier, generation),
            copilot: VisualFollowUpHandler::new(
                provider,
                history,
                settings.conversation_temperature,
                settings.models,
                settings.generation_timeout,
            ),
        })
    }

    pub async fn detect_intent(
        &self,
        prompt: &str,
        history: &[ConversationMessage],
        profile: &UserProfile,
    ) -> Intent {
        self.detect_intent_traced(prompt, history, profile, trace_id()).await
    }

    async fn detect_intent_traced(
        &self,
        prompt: &str,
        history: &[ConversationMessage],
        profile: &UserProfile,
        trace_id: String,
    ) -> Intent {
        self.intent
            .handle(DetectIntentCommand {
                prompt: prompt.to_string(),
                history: history.to_vec(),
                profile: profile.clone(),
                trace_id,
            })
            .await
            .intent
    }

    pub async fn route_structural_calculation(
        &self,
        prompt: &str,
        profile: &UserProfile,
        sufficient: bool,
    ) -> Result<CalculationOutcome, RouteCalculationError> {
        self.structural
            .handle(calculation_command(prompt, profile, sufficient, trace_id()))
            .await
    }

    pub async fn route_geotechnical_calculation(
        &self,
        prompt: &str,
        profile: &UserProfile,
        sufficient: bool,
    ) -> Result<CalculationOutcome, RouteCalculationError> {
        self.geotechnical
            .handle(calculation_command(prompt, profile, sufficient, trace_id()))
            .await
    }

    pub async fn route_document_generation(
        &self,
        prompt: &str,
        role: DocumentRole,
        hint: Option<DocumentKind>,
        profile: &UserProfile,
        project_context: Option<&ProjectContext>,
    ) -> Result<DocumentPayload, RouteDocumentError> {
        self.documents
            .handle(RouteDocumentCommand {
                prompt: prompt.to_string(),
                role,
                hint,
                profile: profile.clone(),
                project_context: project_context.cloned(),
                trace_id: trace_id(),
            })
            .await
    }

    pub async fn stream_conversation(
        &self,
        prompt: &str,
        history: &[ConversationMessage],
        profile: &UserProfile,
    ) -> Result<StreamConversationResult, StreamError> {
        self.conversation
            .handle(StreamConversationCommand {
                prompt: prompt.to_string(),
                history: history.to_vec(),
                profile: profile.clone(),
                trace_id: trace_id(),
            })
            .await
    }

    pub async fn analyze_site_image(
        &self,
        prompt: &str,
        images: &[InlineImage],
        profile: &UserProfile,
    ) -> Result<AnalysisSummary, AnalyzeImageError> {
        self.analysis
            .handle(AnalyzeImageCommand {
                prompt: prompt.to_string(),
                images: images.to_vec(),
                profile: profile.clone(),
                trace_id: trace_id(),
            })
            .await
    }

    pub async fn stream_visual_follow_up(
        &self,
        prompt: &str,
        images: &[InlineImage],
        history: &[ConversationMessage],
        profile: &UserProfile,
    ) -> Result<StreamConversationResult, StreamError> {
        self.copilot
            .handle(VisualFollowUpCommand {
                prompt: prompt.to_string(),
                images: images.to_vec(),
                history: history.to_vec(),
                profile: profile.clone(),
                trace_id: trace_id(),
            })
            .await
    }

    /// Runs one full turn.
    ///
    /// Image-bearing turns skip intent detection: they go to the co-pilot
    /// when the last reply was an image analysis, otherwise to the analysis
    /// agent. Streaming replies leave the record in `Generating`; call
    /// [`TurnOutcome::finish_stream`] once the stream ends.
    pub async fn handle_turn(
        &self,
        turn: &UserTurn,
        history: &[ConversationMessage],
        profile: &UserProfile,
        project_context: Option<&ProjectContext>,
    ) -> TurnOutcome {
        let mut record = TurnRecord::start();
        let trace_id = record.id().to_string();
        advance(&mut record, TurnPhase::ClassifyingIntent);

        let (intent, agent) = if turn.has_images() {
            let agent = if follows_analysis(history) {
                AgentKind::Copilot
            } else {
                AgentKind::Analysis
            };
            (None, agent)
        } else {
            let intent = self
                .detect_intent_traced(turn.prompt(), history, profile, trace_id.clone())
                .await;
            (Some(intent), intent.agent())
        };
        advance(&mut record, TurnPhase::Routing);
        info!(trace_id = %trace_id, %agent, tier = %profile.engine_tier, "turn routed");

        let reply = match (intent, agent) {
            (_, AgentKind::Analysis) => self
                .analysis
                .handle(AnalyzeImageCommand {
                    prompt: turn.prompt().to_string(),
                    images: turn.images().to_vec(),
                    profile: profile.clone(),
                    trace_id,
                })
                .await
                .map(TurnReply::Analysis)
                .or_else(|err| match err {
                    AnalyzeImageError::NeedsInput(needs) => Ok(TurnReply::NeedsInput(needs)),
                    AnalyzeImageError::CapabilityDenied(denied) => Err(denied.into()),
                    AnalyzeImageError::NoImage => Err(TurnError::NoImage),
                    AnalyzeImageError::GenerationFailure(failure) => Err(failure.into()),
                }),
            (_, AgentKind::Copilot) => self
                .copilot
                .handle(VisualFollowUpCommand {
                    prompt: turn.prompt().to_string(),
                    images: turn.images().to_vec(),
                    history: history.to_vec(),
                    profile: profile.clone(),
                    trace_id,
                })
                .await
                .map(TurnReply::Streaming)
                .map_err(stream_error),
            (Some(Intent::Structural { sufficient_data }), _) => self
                .structural
                .handle(calculation_command(turn.prompt(), profile, sufficient_data, trace_id))
                .await
                .map(calculation_reply)
                .map_err(|err| calculation_error(err, agent)),
            (Some(Intent::Geotechnical { sufficient_data }), _) => self
                .geotechnical
                .handle(calculation_command(turn.prompt(), profile, sufficient_data, trace_id))
                .await
                .map(calculation_reply)
                .map_err(|err| calculation_error(err, agent)),
            (Some(Intent::DocumentGeneration { role, document_type }), _) => self
                .documents
                .handle(RouteDocumentCommand {
                    prompt: turn.prompt().to_string(),
                    role,
                    hint: document_type,
                    profile: profile.clone(),
                    project_context: project_context.cloned(),
                    trace_id,
                })
                .await
                .map(TurnReply::Document)
                .or_else(|err| match err {
                    RouteDocumentError::NeedsInput(needs) => Ok(TurnReply::NeedsInput(needs)),
                    RouteDocumentError::CapabilityDenied(denied) => Err(denied.into()),
                    RouteDocumentError::UnsupportedTask(_) => Err(TurnError::UnsupportedTask(agent)),
                    RouteDocumentError::GenerationFailure(failure) => Err(failure.into()),
                }),
            _ => {
                if self.conversation.uses_rag(profile) {
                    advance(&mut record, TurnPhase::RagLookup);
                }
                self.conversation
                    .handle(StreamConversationCommand {
                        prompt: turn.prompt().to_string(),
                        history: history.to_vec(),
                        profile: profile.clone(),
                        trace_id,
                    })
                    .await
                    .map(TurnReply::Streaming)
                    .map_err(stream_error)
            }
        };

        match &reply {
            Ok(TurnReply::Streaming(_)) => advance(&mut record, TurnPhase::Generating),
            Ok(_) => {
                advance(&mut record, TurnPhase::Generating);
                advance(&mut record, TurnPhase::Completed);
            }
            Err(TurnError::GenerationFailure(_)) | Err(TurnError::Provider(_)) => {
                if record.current() == TurnPhase::Routing {
                    advance(&mut record, TurnPhase::Generating);
                }
                fail(&mut record);
            }
            Err(_) => fail(&mut record),
        }

        TurnOutcome {
            record,
            intent,
            agent,
            reply,
        }
    }
}

fn follows_analysis(history: &[ConversationMessage]) -> bool {
    history
        .iter()
        .rev()
        .find(|m| m.is_ai() && !m.is_typing())
        .map(|m| matches!(m.content(), MessageContent::Analysis(_)))
        .unwrap_or(false)
}

fn calculation_command(
    prompt: &str,
    profile: &UserProfile,
    sufficient: bool,
    trace_id: String,
) -> RouteCalculationCommand {
    RouteCalculationCommand {
        prompt: prompt.to_string(),
        profile: profile.clone(),
        sufficient,
        trace_id,
    }
}

fn calculation_reply(outcome: CalculationOutcome) -> TurnReply {
    match outcome {
        CalculationOutcome::Calculated(payload) => TurnReply::Calculation(payload),
        CalculationOutcome::NeedsInput(needs) => TurnReply::NeedsInput(needs),
    }
}

fn calculation_error(err: RouteCalculationError, agent: AgentKind) -> TurnError {
    match err {
        RouteCalculationError::CapabilityDenied(denied) => denied.into(),
        RouteCalculationError::UnsupportedTask => TurnError::UnsupportedTask(agent),
        RouteCalculationError::GenerationFailure(failure) => failure.into(),
    }
}

fn stream_error(err: StreamError) -> TurnError {
    match err {
        StreamError::CapabilityDenied(denied) => denied.into(),
        StreamError::Provider(err) => err.into(),
    }
}
