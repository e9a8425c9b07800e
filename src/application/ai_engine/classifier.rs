//! Constrained classifier.
//!
//! One primitive for every classify-then-fallback call site: intent,
//! sub-task, sufficiency and corpus selection. The model is asked for JSON
//! restricted to a taxonomy at temperature 0; anything short of a resolvable
//! answer yields the caller's fallback.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::ports::{AIError, AIProvider, CompletionRequest, MessageRole, RequestMetadata};

/// A closed answer space the classifier may return.
pub trait Taxonomy: Send + Sync {
    type Label: Send;

    /// Schema and operation name, e.g. `intent`.
    fn name(&self) -> &str;

    /// JSON Schema (top-level object) the answer must match.
    fn schema(&self) -> Value;

    /// Maps a parsed answer to a label, `None` when outside the taxonomy.
    fn resolve(&self, answer: &Value) -> Option<Self::Label>;
}

/// Why a classification fell back.
#[derive(Debug, Error)]
pub enum ClassificationFailure {
    #[error("transport error: {0}")]
    Transport(#[from] AIError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("empty response")]
    Empty,

    #[error("unparseable response: {0}")]
    Unparseable(String),

    #[error("answer outside taxonomy")]
    OutOfTaxonomy,
}

/// Low-temperature, schema-constrained classification with fallback.
#[derive(Clone)]
pub struct ConstrainedClassifier {
    provider: Arc<dyn AIProvider>,
    timeout: Duration,
    model: Option<String>,
}

impl ConstrainedClassifier {
    pub fn new(provider: Arc<dyn AIProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Classifies `prompt`, returning `fallback` on any failure.
    pub async fn classify<T: Taxonomy>(
        &self,
        taxonomy: &T,
        instruction: &str,
        prompt: &str,
        trace_id: &str,
        fallback: T::Label,
    ) -> T::Label {
        match self.try_classify(taxonomy, instruction, prompt, trace_id).await {
            Ok(label) => label,
            Err(failure) => {
                warn!(
                    operation = taxonomy.name(),
                    trace_id,
                    error = %failure,
                    "classification fell back"
                );
                fallback
            }
        }
    }

    /// Classifies `prompt`, reporting why it could not.
    pub async fn try_classify<T: Taxonomy>(
        &self,
        taxonomy: &T,
        instruction: &str,
        prompt: &str,
        trace_id: &str,
    ) -> Result<T::Label, ClassificationFailure> {
        let mut request = CompletionRequest::new(RequestMetadata::new(trace_id, taxonomy.name()))
            .with_system_prompt(instruction)
            .with_message(MessageRole::User, prompt)
            .with_temperature(0.0)
            .with_response_schema(taxonomy.name(), taxonomy.schema());
        if let Some(ref model) = self.model {
            request = request.with_model(model.clone());
        }

        let response = timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| ClassificationFailure::Timeout(self.timeout))??;

        let text = strip_code_fence(&response.content);
        if text.is_empty() {
            return Err(ClassificationFailure::Empty);
        }
        let answer: Value = serde_json::from_str(text)
            .map_err(|e| ClassificationFailure::Unparseable(e.to_string()))?;
        debug!(operation = taxonomy.name(), %answer, "classification answer");

        taxonomy
            .resolve(&answer)
            .ok_or(ClassificationFailure::OutOfTaxonomy)
    }
}

/// Removes a surrounding Markdown code fence, if any, and trims.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
