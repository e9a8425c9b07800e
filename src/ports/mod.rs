//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the orchestration core and the outside world. Adapters implement these
//! ports.
//!
//! - `AIProvider` - Single-shot and streaming generation
//! - `DocumentCorpus` - Listing of reference documents for retrieval

mod ai_provider;
mod document_corpus;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, ResponseSchema, StreamChunk,
    TokenUsage,
};
pub use document_corpus::{CorpusEntry, CorpusError, DocumentCorpus};
