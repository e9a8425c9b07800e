//! Structural calculation specialists.

use std::sync::Arc;

use crate::application::ai_engine::{
    ConstrainedClassifier, GenerationSettings, SpecialistRegistry, SpecialistSpec,
    StructuredSpecialist,
};
use crate::domain::engine::{Capability, EngineTier};
use crate::domain::payload::CalculationResult;
use crate::domain::tasks::{StructuralTask, TaskTag};
use crate::ports::AIProvider;

const ROLE: &str = "You are a senior structural engineer producing a verifiable design calculation.";

fn rubric(method: &str) -> String {
    format!(
        "{ROLE}\n{method}\nState every assumption. List the given data with units. \
         Show each derivation step with its formula and numeric result, then \
         verify each limit state as OK, FAIL or WARNING."
    )
}

/// Specification of the specialist for `task`.
pub fn spec(task: StructuralTask) -> SpecialistSpec {
    let (method, inputs, preflight): (&str, &[&str], bool) = match task {
        StructuralTask::SeismicLoad => (
            "Compute the design base shear and its distribution over storeys with the \
             equivalent lateral force method.",
            &["seismic zone or design acceleration", "building weight", "building height"],
            false,
        ),
        StructuralTask::WindLoad => (
            "Derive the peak velocity pressure and wind forces on the structure.",
            &["basic wind speed", "terrain category", "building dimensions"],
            false,
        ),
        StructuralTask::LoadCombination => (
            "Combine permanent, imposed and environmental actions for ULS and SLS \
             with the partial factors of the standard.",
            &["load values"],
            false,
        ),
        StructuralTask::BeamDesign => (
            "Design the beam for bending and shear and check its serviceability.",
            &["span", "loads", "material"],
            true,
        ),
        StructuralTask::ColumnDesign => (
            "Design the column for axial force and moments including slenderness effects.",
            &["axial load", "column height", "section", "material"],
            true,
        ),
        StructuralTask::SlabDesign => (
            "Design the slab reinforcement for bending and check punching and deflection.",
            &["span", "thickness", "loads", "material"],
            true,
        ),
        StructuralTask::FootingDesign => (
            "Size the footing for allowable bearing pressure and design its reinforcement.",
            &["column load", "bearing capacity", "material"],
            true,
        ),
        StructuralTask::ConnectionDesign => (
            "Design the bolted or welded connection for the given forces.",
            &["design forces", "member sections", "connection type"],
            true,
        ),
        StructuralTask::RetainingWall => (
            "Check the retaining wall for sliding, overturning and bearing and design the stem.",
            &["retained height", "soil properties", "surcharge"],
            false,
        ),
        StructuralTask::SteelMemberCheck => (
            "Check the steel member resistance to the combined design actions.",
            &["section", "steel grade", "design forces", "length"],
            false,
        ),
        StructuralTask::DeflectionCheck => (
            "Compute the deflection and compare it with the span/deflection limits.",
            &["span", "loads", "section stiffness"],
            false,
        ),
    };

    let spec = SpecialistSpec::new(
        task.label(),
        task.tag(),
        rubric(method),
        CalculationResult::output_schema(task.tag()),
    )
    .requires(inputs.iter().copied());
    if preflight {
        spec.with_preflight()
    } else {
        spec
    }
}

/// Registry with a specialist for every structural task.
pub fn registry(
    provider: Arc<dyn AIProvider>,
    classifier: &ConstrainedClassifier,
    settings: &GenerationSettings,
) -> SpecialistRegistry<StructuralTask, CalculationResult> {
    let mut registry = SpecialistRegistry::new("structural", Capability::StructuralCalculation);
    for task in StructuralTask::all() {
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
