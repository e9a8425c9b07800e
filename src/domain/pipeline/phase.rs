//! Turn phases and their allowed transitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Phase of the per-turn pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    ClassifyingIntent,
    Routing,
    RagLookup,
    Generating,
    Completed,
    Failed,
    Cancelled,
}

impl StateMachine for TurnPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        use TurnPhase::*;
        match self {
            Idle => vec![ClassifyingIntent],
            ClassifyingIntent => vec![Routing],
            Routing => vec![RagLookup, Generating, Failed],
            RagLookup => vec![Generating],
            Generating => vec![Completed, Failed, Cancelled],
            Completed | Failed | Cancelled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_with_rag() {
        let phase = TurnPhase::Idle
            .transition_to(TurnPhase::ClassifyingIntent)
            .and_then(|p| p.transition_to(TurnPhase::Routing))
            .and_then(|p| p.transition_to(TurnPhase::RagLookup))
            .and_then(|p| p.transition_to(TurnPhase::Generating))
            .and_then(|p| p.transition_to(TurnPhase::Completed))
            .unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn routing_can_fail_but_not_complete() {
        assert!(TurnPhase::Routing.can_transition_to(&TurnPhase::Failed));
        assert!(!TurnPhase::Routing.can_transition_to(&TurnPhase::Completed));
        assert!(!TurnPhase::Routing.can_transition_to(&TurnPhase::Cancelled));
    }

    #[test]
    fn rag_lookup_cannot_be_skipped_backwards() {
        assert!(TurnPhase::Generating
            .transition_to(TurnPhase::RagLookup)
            .is_err());
    }

    #[test]
    fn terminal_phases() {
        for phase in [TurnPhase::Completed, TurnPhase::Failed, TurnPhase::Cancelled] {
            assert!(phase.is_terminal());
        }
        assert!(!TurnPhase::Idle.is_terminal());
    }
}
