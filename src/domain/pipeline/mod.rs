//! Per-turn pipeline lifecycle.

mod phase;
mod record;

pub use phase::TurnPhase;
pub use record::TurnRecord;
