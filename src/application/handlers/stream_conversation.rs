//! StreamConversationHandler - Open a cancellable conversational answer
//!
//! Serializes prior turns, injects retrieval context when the tier allows
//! it, and hands back a streaming channel with its cancel handle.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::ai_engine::{
    CancelHandle, RagContext, RagContextInjector, StreamingChannel, TierModels,
};
use crate::domain::conversation::{ConversationMessage, HistoryBuilder, HistoryEntry, HistoryRole, InlineImage};
use crate::domain::engine::{Capability, CapabilityDenied, CapabilityGate};
use crate::domain::profile::UserProfile;
use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, Message, RequestMetadata,
};

/// Command to start a streamed answer
#[derive(Debug, Clone)]
pub struct StreamConversationCommand {
    pub prompt: String,
    pub history: Vec<ConversationMessage>,
    pub profile: UserProfile,
    pub trace_id: String,
}

/// Open stream plus the context it was grounded on
pub struct StreamConversationResult {
    pub channel: StreamingChannel,
    pub cancel: CancelHandle,
    pub rag: Option<RagContext>,
}

impl std::fmt::Debug for StreamConversationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConversationResult")
            .field("state", &self.channel.state())
            .field("rag", &self.rag)
            .finish()
    }
}

/// Error type for streamed generations
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error("could not start the answer: {0}")]
    Provider(#[from] AIError),
}

/// Builds the model messages for a streamed answer.
pub(crate) fn conversation_messages(
    history: &[HistoryEntry],
    prompt: &str,
    images: Vec<InlineImage>,
) -> Vec<Message> {
    history
        .iter()
        .map(|entry| match entry.role {
            HistoryRole::User => Message::user(&entry.text),
            HistoryRole::Model => Message::assistant(&entry.text),
        })
        .chain([Message::user(prompt).with_images(images)])
        .collect()
}

/// Opens a generation stream, giving up once `timeout` elapses.
pub(crate) async fn open_stream(
    provider: &dyn AIProvider,
    request: CompletionRequest,
    timeout: Duration,
) -> Result<ChunkStream, AIError> {
    let operation = request.metadata.operation.clone();
    match tokio::time::timeout(timeout, provider.stream_complete(request)).await {
        Ok(opened) => opened,
        Err(_) => {
            warn!(%operation, timeout_ms = timeout.as_millis() as u64, "stream did not open in time");
            Err(AIError::Timeout {
                timeout_secs: timeout.as_secs() as u32,
            })
        }
    }
}

/// Handler for the conversational agent
pub struct StreamConversationHandler {
    provider: Arc<dyn AIProvider>,
    rag: Option<Arc<RagContextInjector>>,
    gate: CapabilityGate,
    history: HistoryBuilder,
    temperature: f32,
    models: TierModels,
    timeout: Duration,
}

impl StreamConversationHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        rag: Option<Arc<RagContextInjector>>,
        history: HistoryBuilder,
        temperature: f32,
        models: TierModels,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            rag,
            gate: CapabilityGate,
            history,
            temperature,
            models,
            timeout,
        }
    }

    /// Whether this turn will consult the corpus.
    pub fn uses_rag(&self, profile: &UserProfile) -> bool {
        self.rag.is_some() && self.gate.allows(Capability::RagInjection, profile.engine_tier)
    }

    pub async fn handle(
        &self,
        cmd: StreamConversationCommand,
    ) -> Result<StreamConversationResult, StreamError> {
        let tier = cmd.profile.engine_tier;
        self.gate.check(Capability::Conversation, tier)?;

        let rag = match self.rag {
            Some(ref injector) if self.uses_rag(&cmd.profile) => {
                injector.inject(&cmd.prompt, &cmd.trace_id).await
            }
            _ => None,
        };

        let history = self.history.build(&cmd.history);
        let mut request = CompletionRequest::new(RequestMetadata::new(&cmd.trace_id, "conversation"))
            .with_system_prompt(system_prompt(&cmd.profile, rag.as_ref()))
            .with_messages(conversation_messages(&history, &cmd.prompt, Vec::new()))
            .with_temperature(self.temperature);
        if let Some(model) = self.models.for_tier(tier) {
            request = request.with_model(model);
        }

        let stream = open_stream(self.provider.as_ref(), request, self.timeout).await?;
        let (channel, cancel) = StreamingChannel::new(stream);
        info!(
            trace_id = %cmd.trace_id,
            %tier,
            history = history.len(),
            rag_source = rag.as_ref().map(|r| r.source.as_str()),
            "conversation stream opened"
        );
        Ok(StreamConversationResult {
            channel,
            cancel,
            rag,
        })
    }
}

fn system_prompt(profile: &UserProfile, rag: Option<&RagContext>) -> String {
    let mut prompt = format!(
        "You are a construction site assistant for engineers, site managers, HSE \
         and quality staff. Give practical, code-aware answers and say when a \
         question needs a calculation or a site check. Refer to {} where a design \
         code applies. Answer in {}.",
        profile.calculation_standard, profile.language
    );
    if let Some(rag) = rag {
        prompt.push_str("\n\n");
        prompt.push_str(&rag.instruction_block());
    }
    prompt
}
