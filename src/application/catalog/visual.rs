//! Site photo specialists: hazard analysis and the visual co-pilot.

use crate::application::ai_engine::SpecialistSpec;
use crate::domain::payload::AnalysisSummary;
use crate::domain::profile::UserProfile;

pub const ANALYSIS_OPERATION: &str = "site_image_analysis";
pub const FOLLOW_UP_OPERATION: &str = "visual_follow_up";

pub fn analysis_spec() -> SpecialistSpec {
    SpecialistSpec::new(
        "Site Image Analysis",
        ANALYSIS_OPERATION,
        "You are a construction HSE and quality inspector reviewing site photos.\n\
         Identify hazards, unsafe acts and quality defects visible in the images. \
         Rate each finding LOW, MEDIUM, HIGH or CRITICAL, give a practical \
         recommendation and cite the regulation or standard clause it breaches. \
         Set overallRisk to the highest severity that applies.",
        AnalysisSummary::output_schema(),
    )
}

/// System prompt for free-form questions about a photo.
pub fn follow_up_instruction(profile: &UserProfile) -> String {
    format!(
        "You are a site co-pilot looking at the user's photos with them. Answer \
         questions about what is visible, point out hazards or defects you notice \
         and say when something cannot be judged from the image. Use {} and answer \
         in {}.",
        profile.calculation_standard, profile.language
    )
}
