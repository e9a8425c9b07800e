//! Application layer - Agents, handlers and the orchestrator.
//!
//! Coordinates the domain types with the generation and corpus ports.

pub mod ai_engine;
pub mod catalog;
pub mod handlers;
pub mod orchestrator;

pub use orchestrator::{
    clarification, Orchestrator, OrchestratorSettings, TurnError, TurnOutcome, TurnReply,
};
