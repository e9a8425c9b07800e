use serde::{Deserialize, Serialize};

use super::TaskTag;

/// Leaf tasks of the structural agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralTask {
    SeismicLoad,
    WindLoad,
    LoadCombination,
    BeamDesign,
    ColumnDesign,
    SlabDesign,
    FootingDesign,
    ConnectionDesign,
    RetainingWall,
    SteelMemberCheck,
    DeflectionCheck,
}

impl TaskTag for StructuralTask {
    fn all() -> &'static [Self] {
        &[
            StructuralTask::SeismicLoad,
            StructuralTask::WindLoad,
            StructuralTask::LoadCombination,
            StructuralTask::BeamDesign,
            StructuralTask::ColumnDesign,
            StructuralTask::SlabDesign,
            StructuralTask::FootingDesign,
            StructuralTask::ConnectionDesign,
            StructuralTask::RetainingWall,
            StructuralTask::SteelMemberCheck,
            StructuralTask::DeflectionCheck,
        ]
    }

    fn tag(&self) -> &'static str {
        match self {
            StructuralTask::SeismicLoad => "seismic_load",
            StructuralTask::WindLoad => "wind_load",
            StructuralTask::LoadCombination => "load_combination",
            StructuralTask::BeamDesign => "beam_design",
            StructuralTask::ColumnDesign => "column_design",
            StructuralTask::SlabDesign => "slab_design",
            StructuralTask::FootingDesign => "footing_design",
            StructuralTask::ConnectionDesign => "connection_design",
            StructuralTask::RetainingWall => "retaining_wall",
            StructuralTask::SteelMemberCheck => "steel_member_check",
            StructuralTask::DeflectionCheck => "deflection_check",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StructuralTask::SeismicLoad => "Seismic Load Analysis",
            StructuralTask::WindLoad => "Wind Load Analysis",
            StructuralTask::LoadCombination => "Load Combination",
            StructuralTask::BeamDesign => "Beam Design",
            StructuralTask::ColumnDesign => "Column Design",
            StructuralTask::SlabDesign => "Slab Design",
            StructuralTask::FootingDesign => "Footing Design",
            StructuralTask::ConnectionDesign => "Connection Design",
            StructuralTask::RetainingWall => "Retaining Wall Design",
            StructuralTask::SteelMemberCheck => "Steel Member Check",
            StructuralTask::DeflectionCheck => "Deflection Check",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_taxonomy_has_eleven_tasks() {
        assert_eq!(StructuralTask::all().len(), 11);
    }

    #[test]
    fn serde_matches_tag() {
        for task in StructuralTask::all() {
            let json = serde_json::to_string(task).unwrap();
            assert_eq!(json, format!("\"{}\"", task.tag()));
        }
    }
}
