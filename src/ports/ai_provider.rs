//! AI Provider Port - Interface for generation clients.
//!
//! This port abstracts all interactions with LLM providers, so the
//! orchestration core can classify, generate structured payloads and stream
//! answers without coupling to a specific vendor API.
//!
//! # Design
//!
//! - Supports both streaming and non-streaming completions
//! - Optional response schema for constrained JSON output
//! - Messages carry inline images for multimodal requests
//! - Error types for common failure modes (rate limits, context too long, etc.)
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
//!         Ok(CompletionResponse {
//!             content: "Hello!".to_string(),
//!             usage: TokenUsage::default(),
//!             model: "echo".to_string(),
//!             finish_reason: FinishReason::Stop,
//!         })
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

use crate::domain::conversation::InlineImage;

/// Boxed stream of completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AIError>> + Send>>;

/// Port for AI/LLM provider interactions.
///
/// Implementations connect to external AI services and translate between
/// the provider-specific API and these request types.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion (non-streaming).
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Generate a streaming completion.
    ///
    /// Returns a stream of chunks as they arrive from the provider.
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError>;

    /// Get provider information (name, model, capabilities).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for AI completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages (history + current user message).
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness (0.0 = deterministic, 1.0+ = creative).
    pub temperature: Option<f32>,
    /// Constrains the output to JSON matching this schema.
    pub response_schema: Option<ResponseSchema>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Creates a new completion request with required metadata.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            response_schema: None,
            model: None,
            metadata,
        }
    }

    /// Adds a text message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Appends prepared messages (e.g. serialized history).
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Requests schema-constrained JSON output.
    pub fn with_response_schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.response_schema = Some(ResponseSchema {
            name: name.into(),
            schema,
        });
        self
    }

    /// Sets the model to use for this request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Named JSON Schema the response must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
    /// Images attached to this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<InlineImage>,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Attaches images to the message.
    pub fn with_images(mut self, images: impl IntoIterator<Item = InlineImage>) -> Self {
        self.images.extend(images);
        self
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Trace ID shared by every call made for one turn.
    pub trace_id: String,
    /// Pipeline operation issuing the call, e.g. `intent`, `beam_design`.
    pub operation: String,
}

impl RequestMetadata {
    /// Creates new request metadata.
    pub fn new(trace_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            operation: operation.into(),
        }
    }
}

/// Response from AI completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Token usage.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Creates zero usage.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit max_tokens limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// An error occurred.
    Error,
}

/// Streaming chunk from AI completion.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// New content in this chunk.
    pub delta: String,
    /// If present, generation is complete.
    pub finish_reason: Option<FinishReason>,
    /// Token usage (only present on final chunk).
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    /// Creates a content chunk.
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
            usage: None,
        }
    }

    /// Creates a final chunk with usage information.
    pub fn final_chunk(finish_reason: FinishReason, usage: TokenUsage) -> Self {
        Self {
            delta: String::new(),
            finish_reason: Some(finish_reason),
            usage: Some(usage),
        }
    }

    /// Returns true if this is the final chunk.
    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Provider information and capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "mock").
    pub name: String,
    /// Default model identifier.
    pub model: String,
    /// Maximum context window size in tokens.
    pub max_context_tokens: u32,
    /// Whether streaming is supported.
    pub supports_streaming: bool,
    /// Whether image inputs are accepted.
    pub supports_vision: bool,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>, max_context_tokens: u32) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            max_context_tokens,
            supports_streaming: true,
            supports_vision: false,
        }
    }

    /// Sets streaming support.
    pub fn with_streaming(mut self, supports: bool) -> Self {
        self.supports_streaming = supports;
        self
    }

    /// Sets image input support.
    pub fn with_vision(mut self, supports: bool) -> Self {
        self.supports_vision = supports;
        self
    }
}

/// AI provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Context (prompt + history) exceeds model limit.
    #[error("context too long: {tokens} tokens exceeds {max} limit")]
    ContextTooLong {
        /// Actual token count.
        tokens: u32,
        /// Maximum allowed.
        max: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a context too long error.
    pub fn context_too_long(tokens: u32, max: u32) -> Self {
        Self::ContextTooLong { tokens, max }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_metadata() -> RequestMetadata {
        RequestMetadata::new("trace-123", "intent")
    }

    #[test]
    fn completion_request_builder_works() {
        let request = CompletionRequest::new(test_metadata())
            .with_message(MessageRole::User, "Hello")
            .with_system_prompt("Be helpful")
            .with_max_tokens(100)
            .with_temperature(0.0)
            .with_response_schema("intent", json!({"type": "object"}))
            .with_model("gpt-4o-mini");

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[0].content, "Hello");
        assert_eq!(request.system_prompt, Some("Be helpful".to_string()));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.response_schema.as_ref().map(|s| s.name.as_str()), Some("intent"));
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.metadata.operation, "intent");
    }

    #[test]
    fn message_constructors_work() {
        assert_eq!(Message::system("s").role, MessageRole::System);
        assert_eq!(Message::user("u").role, MessageRole::User);
        assert_eq!(Message::assistant("a").role, MessageRole::Assistant);
    }

    #[test]
    fn message_carries_images() {
        let image = InlineImage::new("image/jpeg", vec![0xff, 0xd8]).unwrap();
        let msg = Message::user("what is wrong here?").with_images([image.clone()]);
        assert_eq!(msg.images, vec![image]);
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
        assert_eq!(TokenUsage::zero().total_tokens, 0);
    }

    #[test]
    fn stream_chunk_content_is_not_final() {
        let chunk = StreamChunk::content("Hello");
        assert!(!chunk.is_final());
        assert_eq!(chunk.delta, "Hello");
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn stream_chunk_final_has_usage() {
        let usage = TokenUsage::new(10, 5);
        let chunk = StreamChunk::final_chunk(FinishReason::Stop, usage.clone());
        assert!(chunk.is_final());
        assert_eq!(chunk.delta, "");
        assert_eq!(chunk.usage, Some(usage));
    }

    #[test]
    fn provider_info_builder_works() {
        let info = ProviderInfo::new("openai", "gpt-4o", 128000).with_vision(true);
        assert_eq!(info.name, "openai");
        assert!(info.supports_streaming);
        assert!(info.supports_vision);
    }

    #[test]
    fn ai_error_retryable_classification() {
        assert!(AIError::rate_limited(30).is_retryable());
        assert!(AIError::unavailable("down").is_retryable());
        assert!(AIError::network("reset").is_retryable());
        assert!(AIError::Timeout { timeout_secs: 30 }.is_retryable());

        assert!(!AIError::AuthenticationFailed.is_retryable());
        assert!(!AIError::context_too_long(100, 50).is_retryable());
        assert!(!AIError::content_filtered("bad").is_retryable());
        assert!(!AIError::parse("bad json").is_retryable());
    }

    #[test]
    fn roles_and_finish_reasons_serialize() {
        assert_eq!(serde_json::to_string(&MessageRole::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(
            serde_json::to_string(&FinishReason::ContentFilter).unwrap(),
            "\"content_filter\""
        );
    }

    #[test]
    fn ai_error_displays_correctly() {
        assert_eq!(AIError::rate_limited(30).to_string(), "rate limited: retry after 30s");
        assert_eq!(
            AIError::context_too_long(200000, 128000).to_string(),
            "context too long: 200000 tokens exceeds 128000 limit"
        );
    }
}
