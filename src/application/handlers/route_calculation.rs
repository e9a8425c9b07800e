//! RouteCalculationHandler - Gate, detect and run a calculation specialist
//!
//! Shared by the structural and geotechnical agents; they differ only in
//! their task set, registry and capability.

use thiserror::Error;

use crate::application::ai_engine::{
    DispatchError, GenerationFailure, SpecialistInput, SpecialistOutcome, SpecialistRegistry,
    SubtaskDetector, TaskSelection,
};
use crate::domain::engine::{Capability, CapabilityDenied, CapabilityGate};
use crate::domain::payload::{CalculationPayload, CalculationResult, InsufficientInput};
use crate::domain::profile::UserProfile;
use crate::domain::tasks::TaskTag;

/// Command to run a calculation
#[derive(Debug, Clone)]
pub struct RouteCalculationCommand {
    pub prompt: String,
    pub profile: UserProfile,
    /// `sufficientData` reported by intent detection.
    pub sufficient: bool,
    pub trace_id: String,
}

/// What the calculation agent produced
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationOutcome {
    Calculated(CalculationPayload),
    NeedsInput(InsufficientInput),
}

/// Error type for calculation routing
#[derive(Debug, Clone, Error)]
pub enum RouteCalculationError {
    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error("no calculation specialist handles this request")]
    UnsupportedTask,

    #[error(transparent)]
    GenerationFailure(#[from] GenerationFailure),
}

impl From<DispatchError> for RouteCalculationError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnsupportedTask => RouteCalculationError::UnsupportedTask,
            DispatchError::CapabilityDenied(denied) => RouteCalculationError::CapabilityDenied(denied),
            DispatchError::GenerationFailure(failure) => {
                RouteCalculationError::GenerationFailure(failure)
            }
        }
    }
}

/// Handler for one calculation agent
pub struct RouteCalculationHandler<K> {
    capability: Capability,
    gate: CapabilityGate,
    detector: SubtaskDetector,
    registry: SpecialistRegistry<K, CalculationResult>,
}

impl<K: TaskTag> RouteCalculationHandler<K> {
    pub fn new(
        capability: Capability,
        detector: SubtaskDetector,
        registry: SpecialistRegistry<K, CalculationResult>,
    ) -> Self {
        Self {
            capability,
            gate: CapabilityGate,
            detector,
            registry,
        }
    }

    pub async fn handle(
        &self,
        cmd: RouteCalculationCommand,
    ) -> Result<CalculationOutcome, RouteCalculationError> {
        // 1. Tier gate before any model call
        self.gate.check(self.capability, cmd.profile.engine_tier)?;

        // 2. Pick the leaf task
        let selection = self
            .detector
            .detect(
                self.registry.agent(),
                K::all().to_vec(),
                &cmd.prompt,
                None,
                &cmd.trace_id,
            )
            .await;

        // 3. Intent already said inputs are missing: ask for the declared ones
        if !cmd.sufficient {
            let TaskSelection::Task(key) = selection else {
                return Err(RouteCalculationError::UnsupportedTask);
            };
            let descriptor = self
                .registry
                .get(key)
                .ok_or(RouteCalculationError::UnsupportedTask)?;
            if let Some(needs) = descriptor.handler.spec().insufficient() {
                return Ok(CalculationOutcome::NeedsInput(needs));
            }
        }

        // 4. Run the specialist
        let input = SpecialistInput::new(cmd.prompt, cmd.profile.clone(), cmd.trace_id);
        let (key, outcome) = self
            .registry
            .dispatch(selection, cmd.profile.engine_tier, &input)
            .await?;

        Ok(match outcome {
            SpecialistOutcome::Generated(result) => CalculationOutcome::Calculated(CalculationPayload {
                task: key.label().to_string(),
                result,
            }),
            SpecialistOutcome::NeedsInput(needs) => CalculationOutcome::NeedsInput(needs),
        })
    }
}
