//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the orchestration core to external systems:
//! - `ai` - Generation clients (OpenAI, mock)
//! - `corpus` - Reference document listings (in-memory, TTL cache)

pub mod ai;
pub mod corpus;

pub use ai::{MockAIProvider, MockError, OpenAIConfig, OpenAIProvider};
pub use corpus::{CachedCorpus, InMemoryCorpus};
