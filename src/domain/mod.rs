//! Domain layer containing the orchestration vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, state machine, errors)
//! - `engine` - Engine tiers and the capability gate
//! - `tasks` - Closed task taxonomies and routing targets
//! - `intent` - Classified purpose of a user turn
//! - `payload` - Structured outputs and their schemas
//! - `conversation` - Transcript messages, user turns and history windowing
//! - `profile` - User and project settings
//! - `pipeline` - Per-turn phase machine

pub mod conversation;
pub mod engine;
pub mod foundation;
pub mod intent;
pub mod payload;
pub mod pipeline;
pub mod profile;
pub mod tasks;
