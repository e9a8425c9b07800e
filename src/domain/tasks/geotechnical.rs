use serde::{Deserialize, Serialize};

use super::TaskTag;

/// Leaf tasks of the geotechnical agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeotechnicalTask {
    BearingCapacity,
    Settlement,
    SlopeStability,
    LateralEarthPressure,
    PileCapacity,
    Liquefaction,
}

impl TaskTag for GeotechnicalTask {
    fn all() -> &'static [Self] {
        &[
            GeotechnicalTask::BearingCapacity,
            GeotechnicalTask::Settlement,
            GeotechnicalTask::SlopeStability,
            GeotechnicalTask::LateralEarthPressure,
            GeotechnicalTask::PileCapacity,
            GeotechnicalTask::Liquefaction,
        ]
    }

    fn tag(&self) -> &'static str {
        match self {
            GeotechnicalTask::BearingCapacity => "bearing_capacity",
            GeotechnicalTask::Settlement => "settlement",
            GeotechnicalTask::SlopeStability => "slope_stability",
            GeotechnicalTask::LateralEarthPressure => "lateral_earth_pressure",
            GeotechnicalTask::PileCapacity => "pile_capacity",
            GeotechnicalTask::Liquefaction => "liquefaction",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GeotechnicalTask::BearingCapacity => "Bearing Capacity",
            GeotechnicalTask::Settlement => "Settlement Analysis",
            GeotechnicalTask::SlopeStability => "Slope Stability",
            GeotechnicalTask::LateralEarthPressure => "Lateral Earth Pressure",
            GeotechnicalTask::PileCapacity => "Pile Capacity",
            GeotechnicalTask::Liquefaction => "Liquefaction Assessment",
        }
    }
}
