//! Retrieval context injection.
//!
//! Picks at most one corpus document by name, then asks the model for a
//! short excerpt relevant to the prompt. Every failure yields no context.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

use super::classifier::ConstrainedClassifier;
use super::taxonomies::CorpusSelection;
use crate::ports::{AIProvider, CompletionRequest, CorpusEntry, DocumentCorpus, Message, RequestMetadata};

/// Retrieved context and the corpus entry it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagContext {
    pub context: String,
    /// Corpus entry name, verbatim.
    pub source: String,
}

impl RagContext {
    /// Instruction block for the consuming generation.
    pub fn instruction_block(&self) -> String {
        format!(
            "REFERENCE DOCUMENT CONTEXT (source: {source}):\n{context}\n\n\
             Base your answer on this context first; it takes priority over your \
             general knowledge. Cite the document by name as \"{source}\" when \
             you use it.",
            source = self.source,
            context = self.context
        )
    }
}

pub struct RagContextInjector {
    classifier: ConstrainedClassifier,
    provider: Arc<dyn AIProvider>,
    corpus: Arc<dyn DocumentCorpus>,
    timeout: Duration,
    model: Option<String>,
}

impl RagContextInjector {
    pub fn new(
        classifier: ConstrainedClassifier,
        provider: Arc<dyn AIProvider>,
        corpus: Arc<dyn DocumentCorpus>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            provider,
            corpus,
            timeout,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Returns context for `prompt`, or `None`.
    pub async fn inject(&self, prompt: &str, trace_id: &str) -> Option<RagContext> {
        let entries = match self.corpus.list_documents().await {
            Ok(entries) if !entries.is_empty() => entries,
            Ok(_) => return None,
            Err(err) => {
                debug!(trace_id, error = %err, "corpus listing failed");
                return None;
            }
        };

        let selection = CorpusSelection::new(entries.iter().map(|e| e.name.clone()).collect());
        let instruction = format!(
            "Pick the one reference document most likely to answer the request, \
             or \"{}\" if none applies. Answer with JSON only.",
            CorpusSelection::NOT_APPLICABLE
        );
        let name = self
            .classifier
            .classify(&selection, &instruction, prompt, trace_id, None)
            .await?;
        let entry = entries.into_iter().find(|e| e.name == name)?;

        let context = self.synthesize(&entry, prompt, trace_id).await?;
        info!(trace_id, source = %entry.name, "retrieval context injected");
        Some(RagContext {
            context,
            source: entry.name,
        })
    }

    async fn synthesize(&self, entry: &CorpusEntry, prompt: &str, trace_id: &str) -> Option<String> {
        let mut description = format!("Document: {}", entry.name);
        for (key, value) in &entry.metadata {
            description.push_str(&format!("\n{}: {}", key, value));
        }

        let mut request = CompletionRequest::new(RequestMetadata::new(trace_id, "rag_synthesis"))
            .with_system_prompt(
                "Extract the passages of the reference document relevant to the \
                 request. Quote values and clause numbers exactly. Reply with the \
                 excerpt only.",
            )
            .with_messages([Message::user(format!("{}\n\nRequest: {}", description, prompt))])
            .with_temperature(0.0);
        if let Some(ref model) = self.model {
            request = request.with_model(model.clone());
        }

        match timeout(self.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => {
                let text = response.content.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Ok(Err(err)) => {
                debug!(trace_id, error = %err, "retrieval synthesis failed");
                None
            }
            Err(_) => {
                debug!(trace_id, "retrieval synthesis timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::corpus::InMemoryCorpus;

    const DRAWINGS: &str = "Structural_Drawings_Rev4.pdf";

    fn injector(provider: &MockAIProvider, corpus: InMemoryCorpus) -> RagContextInjector {
        let provider: Arc<dyn AIProvider> = Arc::new(provider.clone());
        RagContextInjector::new(
            ConstrainedClassifier::new(provider.clone(), Duration::from_secs(1)),
            provider,
            Arc::new(corpus),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn source_is_corpus_entry_name() {
        let provider = MockAIProvider::new()
            .with_operation_response("corpus_selection", r#"{"document":"structural_drawings_rev4.pdf"}"#)
            .with_operation_response("rag_synthesis", "Level 5 slab: C35/45, 250 mm thick.");
        let corpus = InMemoryCorpus::with_names([DRAWINGS, "Site_Logistics.pdf"]);

        let rag = injector(&provider, corpus)
            .inject("slab strength on level 5", "t")
            .await
            .unwrap();
        assert_eq!(rag.source, DRAWINGS);
        assert_eq!(rag.context, "Level 5 slab: C35/45, 250 mm thick.");
        assert!(rag.instruction_block().contains("\"Structural_Drawings_Rev4.pdf\""));
    }

    #[tokio::test]
    async fn empty_corpus_skips_model() {
        let provider = MockAIProvider::new();
        assert!(injector(&provider, InMemoryCorpus::new()).inject("q", "t").await.is_none());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn not_applicable_or_unknown_name_yields_none() {
        for answer in [r#"{"document":"N/A"}"#, r#"{"document":"Other.pdf"}"#] {
            let provider = MockAIProvider::new().with_operation_response("corpus_selection", answer);
            let corpus = InMemoryCorpus::with_names([DRAWINGS]);
            assert!(injector(&provider, corpus).inject("q", "t").await.is_none());
            assert_eq!(provider.operations(), vec!["corpus_selection"]);
        }
    }

    #[tokio::test]
    async fn corpus_error_yields_none() {
        let corpus = InMemoryCorpus::with_names([DRAWINGS]);
        corpus.set_unavailable(Some("share offline".into())).await;
        let provider = MockAIProvider::new();
        assert!(injector(&provider, corpus).inject("q", "t").await.is_none());
    }

    #[tokio::test]
    async fn empty_or_failed_synthesis_yields_none() {
        let selection = format!(r#"{{"document":"{}"}}"#, DRAWINGS);

        let empty = MockAIProvider::new()
            .with_operation_response("corpus_selection", selection.clone())
            .with_operation_response("rag_synthesis", "  ");
        let failed = MockAIProvider::new()
            .with_operation_response("corpus_selection", selection)
            .with_operation_error("rag_synthesis", MockError::Network { message: "reset".into() });

        for provider in [empty, failed] {
            let corpus = InMemoryCorpus::with_names([DRAWINGS]);
            assert!(injector(&provider, corpus).inject("q", "t").await.is_none());
        }
    }
}
