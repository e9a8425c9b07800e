//! AI provider adapters.
//!
//! - `OpenAIProvider` - Chat completions over HTTP with SSE streaming
//! - `MockAIProvider` - Scripted provider for tests and offline runs

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
