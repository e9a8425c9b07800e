//! State machine trait for lifecycle enums.
//!
//! Gives status enums (such as the per-turn pipeline phase) a single way to
//! validate and perform transitions.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their valid transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for TurnPhase {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Idle => vec![ClassifyingIntent],
///             // ... etc
///         }
///     }
/// }
///
/// let next = phase.transition_to(TurnPhase::Routing)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
