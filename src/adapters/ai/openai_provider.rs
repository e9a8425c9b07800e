//! OpenAI Provider - Implementation of AIProvider for OpenAI's chat API.
//!
//! Supports schema-constrained JSON output (`response_format: json_schema`),
//! inline images as `data:` URIs, and streaming completions via SSE.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events (SSE) for streaming responses. Each chunk is parsed
//! and yielded as a `StreamChunk` until the `[DONE]` marker is received.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, StreamChunk, TokenUsage,
};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Default model when a request names none.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the HTTP client cannot be built
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_message(msg: &Message) -> OpenAIMessage {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
        .to_string();

        let content = if msg.images.is_empty() {
            OpenAIContent::Text(msg.content.clone())
        } else {
            let mut parts = vec![ContentPart::Text {
                text: msg.content.clone(),
            }];
            parts.extend(msg.images.iter().map(|image| ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_uri(),
                },
            }));
            OpenAIContent::Parts(parts)
        };

        OpenAIMessage { role, content }
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest, stream: bool) -> OpenAIRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(Self::to_openai_message(&Message::system(prompt.clone())));
        }
        messages.extend(request.messages.iter().map(Self::to_openai_message));

        OpenAIRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.response_schema.as_ref().map(|schema| ResponseFormat {
                kind: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: schema.name.clone(),
                    schema: schema.schema.clone(),
                    strict: false,
                },
            }),
            stream: Some(stream),
            stream_options: if stream {
                Some(StreamOptions {
                    include_usage: true,
                })
            } else {
                None
            },
        }
    }

    /// Sends a request and maps transport failures.
    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request, stream);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })?;

        self.handle_response_status(response).await
    }

    /// Retries `send` with exponential backoff while the error is retryable.
    async fn send_with_retry(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<Response, AIError> {
        let mut attempt = 0;
        loop {
            match self.send(request, stream).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s, ...
                    let delay = Duration::from_secs(1 << attempt);
                    warn!(
                        operation = %request.metadata.operation,
                        attempt,
                        error = %err,
                        "retrying OpenAI request"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => {
                if error_body.contains("maximum context length")
                    || error_body.contains("context_length_exceeded")
                {
                    Err(AIError::context_too_long(0, 0))
                } else if error_body.contains("content_filter") {
                    Err(AIError::content_filtered(error_body))
                } else {
                    Err(AIError::InvalidRequest(error_body))
                }
            }
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        // Default to 30 seconds if we can't parse
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(s) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = s.find("try again in ") {
                    let rest = &s[idx + 13..];
                    if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                        if let Ok(secs) = rest[..num_end].parse::<u32>() {
                            return secs;
                        }
                    }
                }
            }
        }
        30
    }

    /// Parses a non-streaming response.
    async fn parse_response(response: Response) -> Result<CompletionResponse, AIError> {
        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let usage = openai_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: openai_response.model,
            finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
        })
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_with_retry(&request, false).await?;
        let completion = Self::parse_response(response).await?;
        debug!(
            operation = %request.metadata.operation,
            model = %completion.model,
            tokens = completion.usage.total_tokens,
            "OpenAI completion finished"
        );
        Ok(completion)
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.send_with_retry(&request, true).await?;

        let mut lines = SseLineBuffer::default();
        let stream = response
            .bytes_stream()
            .map(move |chunk_result| match chunk_result {
                Ok(bytes) => lines
                    .push(&bytes)
                    .map(|complete| parse_sse_chunks(&complete))
                    .unwrap_or_default(),
                Err(e) => vec![Err(AIError::network(format!("Stream error: {}", e)))],
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        let model = self.config.model.as_str();
        let max_context = match model {
            m if m.starts_with("gpt-4o") || m.starts_with("gpt-4.1") => 128000,
            m if m.starts_with("gpt-4-turbo") => 128000,
            m if m.starts_with("gpt-4") => 8192,
            m if m.starts_with("gpt-3.5") => 16384,
            _ => 128000,
        };
        let vision = model.starts_with("gpt-4o")
            || model.starts_with("gpt-4.1")
            || model.starts_with("gpt-4-turbo");

        ProviderInfo::new("openai", model, max_context)
            .with_streaming(true)
            .with_vision(vision)
    }
}

/// Accumulates raw SSE bytes and releases only whole lines.
///
/// Network reads can end inside a multi-byte character, so decoding waits
/// for the newline that closes the line.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(bytes);
        let end = self.pending.iter().rposition(|b| *b == b'\n')?;
        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        Some(match String::from_utf8(complete) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }
}

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

/// Parses SSE data lines into StreamChunks.
fn parse_sse_chunks(text: &str) -> Vec<Result<StreamChunk, AIError>> {
    let mut results = Vec::new();

    for line in text.lines() {
        let Some(data) = line.strip_prefix("data:").map(str::trim) else {
            continue;
        };
        if data.is_empty() || data == "[DONE]" {
            continue;
        }

        match serde_json::from_str::<StreamResponseChunk>(data) {
            Ok(chunk) => {
                let usage = chunk
                    .usage
                    .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
                if let Some(choice) = chunk.choices.first() {
                    if let Some(ref content) = choice.delta.content {
                        if !content.is_empty() {
                            results.push(Ok(StreamChunk::content(content)));
                        }
                    }
                    if let Some(ref reason) = choice.finish_reason {
                        results.push(Ok(StreamChunk::final_chunk(
                            parse_finish_reason(Some(reason)),
                            usage.unwrap_or_default(),
                        )));
                    }
                }
            }
            Err(e) => results.push(Err(AIError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))),
        }
    }

    results
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: OpenAIContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
