//! Geotechnical calculation specialists.

use std::sync::Arc;

use crate::application::ai_engine::{
    ConstrainedClassifier, GenerationSettings, SpecialistRegistry, SpecialistSpec,
    StructuredSpecialist,
};
use crate::domain::engine::{Capability, EngineTier};
use crate::domain::payload::CalculationResult;
use crate::domain::tasks::{GeotechnicalTask, TaskTag};
use crate::ports::AIProvider;

pub fn spec(task: GeotechnicalTask) -> SpecialistSpec {
    let (method, inputs): (&str, &[&str]) = match task {
        GeotechnicalTask::BearingCapacity => (
            "Compute the ultimate and allowable bearing capacity of the foundation.",
            &["foundation dimensions", "embedment depth", "soil strength parameters"],
        ),
        GeotechnicalTask::Settlement => (
            "Estimate immediate and consolidation settlement under the applied pressure.",
            &["applied pressure", "foundation dimensions", "soil compressibility"],
        ),
        GeotechnicalTask::SlopeStability => (
            "Compute the factor of safety of the slope against the critical slip surface.",
            &["slope geometry", "soil strength parameters", "groundwater level"],
        ),
        GeotechnicalTask::LateralEarthPressure => (
            "Compute the active, passive or at-rest earth pressure distribution and resultants.",
            &["wall height", "soil unit weight", "friction angle"],
        ),
        GeotechnicalTask::PileCapacity => (
            "Compute the shaft and base resistance and the design capacity of the pile.",
            &["pile diameter", "pile length", "soil profile"],
        ),
        GeotechnicalTask::Liquefaction => (
            "Assess liquefaction triggering with the simplified cyclic stress procedure.",
            &["design acceleration", "SPT or CPT data", "groundwater level"],
        ),
    };

    let spec = SpecialistSpec::new(
        task.label(),
        task.tag(),
        format!(
            "You are a senior geotechnical engineer producing a verifiable calculation.\n\
             {method}\nState soil parameters and their source, show each step with its \
             formula and numeric result, and verify each criterion as OK, FAIL or WARNING."
        ),
        CalculationResult::output_schema(task.tag()),
    )
    .requires(inputs.iter().copied());
    if task == GeotechnicalTask::PileCapacity {
        spec.with_preflight()
    } else {
        spec
    }
}

pub fn registry(
    provider: Arc<dyn AIProvider>,
    classifier: &ConstrainedClassifier,
    settings: &GenerationSettings,
) -> SpecialistRegistry<GeotechnicalTask, CalculationResult> {
    let mut registry = SpecialistRegistry::new("geotechnical", Capability::GeotechnicalCalculation);
    for task in GeotechnicalTask::all() {
        registry.register(
            *task,
            EngineTier::Premium,
            Arc::new(StructuredSpecialist::<CalculationResult>::new(
                spec(*task),
                provider.clone(),
                classifier.clone(),
                settings.clone(),
            )),
        );
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pile_capacity_runs_preflight() {
        for task in GeotechnicalTask::all() {
            assert_eq!(spec(*task).preflight, *task == GeotechnicalTask::PileCapacity);
        }
    }

    #[test]
    fn operation_matches_tag() {
        let slope = spec(GeotechnicalTask::SlopeStability);
        assert_eq!(slope.operation, "slope_stability");
        assert_eq!(slope.schema.name, "slope_stability");
    }
}
