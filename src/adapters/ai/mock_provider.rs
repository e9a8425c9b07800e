//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, globally queued or keyed by operation
//! - Explicit stream chunks with per-chunk delay for cancellation tests
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_operation_response("intent", r#"{"intent":"conversation"}"#)
//!     .with_stream_chunks(["Cover ", "is ", "75 mm."]);
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// Mock AI provider for testing.
///
/// Configurable to return specific responses, simulate delays, or inject errors.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses reserved for one `RequestMetadata::operation`.
    by_operation: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Pause before each streamed chunk.
    chunk_delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Stream exactly these chunks.
    Chunks(Vec<String>),
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate context too long.
    ContextTooLong { tokens: u32, max: u32 },
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong { tokens, max } => AIError::context_too_long(tokens, max),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            by_operation: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 128000)
                .with_streaming(true)
                .with_vision(true),
            delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn success(content: impl Into<String>) -> MockResponse {
        MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        }
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Self::success(content))
    }

    /// Adds a successful response with full configuration.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a streamed response made of exactly these chunks.
    pub fn with_stream_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Reserves a response for calls whose metadata names `operation`.
    ///
    /// Keyed responses are served before the shared queue.
    pub fn with_operation_response(
        self,
        operation: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.with_operation(operation, Self::success(content))
    }

    /// Reserves an error for calls whose metadata names `operation`.
    pub fn with_operation_error(self, operation: impl Into<String>, error: MockError) -> Self {
        self.with_operation(operation, MockResponse::Error(error))
    }

    fn with_operation(self, operation: impl Into<String>, response: MockResponse) -> Self {
        lock(&self.by_operation)
            .entry(operation.into())
            .or_default()
            .push_back(response);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the pause before each streamed chunk.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the operations of all recorded calls, in order.
    pub fn operations(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .map(|c| c.metadata.operation.clone())
            .collect()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response for `operation`, then from the queue, or a default.
    fn next_response(&self, operation: &str) -> MockResponse {
        if let Some(response) = lock(&self.by_operation)
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Self::success("Mock response"))
    }

    fn record(&self, request: CompletionRequest) -> String {
        let operation = request.metadata.operation.clone();
        lock(&self.calls).push(request);
        operation
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let operation = self.record(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(&operation) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason,
            }),
            MockResponse::Chunks(chunks) => Ok(CompletionResponse {
                content: chunks.concat(),
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let operation = self.record(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let (deltas, usage, finish_reason) = match self.next_response(&operation) {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => {
                // Split content into word chunks for streaming simulation
                let words = content
                    .split_whitespace()
                    .map(|s| format!("{} ", s))
                    .collect::<Vec<_>>();
                (words, usage, finish_reason)
            }
            MockResponse::Chunks(chunks) => (chunks, TokenUsage::new(10, 20), FinishReason::Stop),
            MockResponse::Error(err) => return Err(err.into()),
        };

        let chunk_delay = self.chunk_delay;
        let chunks = stream::iter(deltas).then(move |delta| async move {
            if !chunk_delay.is_zero() {
                sleep(chunk_delay).await;
            }
            Ok(StreamChunk::content(delta))
        });
        let final_chunk = stream::once(async move { Ok(StreamChunk::final_chunk(finish_reason, usage)) });

        Ok(Box::pin(chunks.chain(final_chunk)))
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
