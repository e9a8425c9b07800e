use serde::{Deserialize, Serialize};

use super::TurnPhase;
use crate::domain::foundation::{StateMachine, Timestamp, TurnId, ValidationError};

/// Phases one turn went through, with the time each was entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    id: TurnId,
    phases: Vec<(TurnPhase, Timestamp)>,
}

impl TurnRecord {
    pub fn start() -> Self {
        Self {
            id: TurnId::new(),
            phases: vec![(TurnPhase::Idle, Timestamp::now())],
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn current(&self) -> TurnPhase {
        self.phases
            .last()
            .map(|(phase, _)| *phase)
            .unwrap_or(TurnPhase::Idle)
    }

    /// Moves to `next`, rejecting transitions the phase machine forbids.
    pub fn advance(&mut self, next: TurnPhase) -> Result<(), ValidationError> {
        let next = self.current().transition_to(next)?;
        self.phases.push((next, Timestamp::now()));
        Ok(())
    }

    pub fn phases(&self) -> Vec<TurnPhase> {
        self.phases.iter().map(|(phase, _)| *phase).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_terminal()
    }
}
