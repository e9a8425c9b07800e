//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and validation errors
//! used across the orchestration core.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{MessageId, TurnId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
