use serde::{Deserialize, Serialize};

use super::TaskTag;

/// Professional role owning a family of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    SiteManager,
    Hse,
    Quality,
}

impl DocumentRole {
    pub const ALL: [DocumentRole; 3] = [
        DocumentRole::SiteManager,
        DocumentRole::Hse,
        DocumentRole::Quality,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            DocumentRole::SiteManager => "site_manager",
            DocumentRole::Hse => "hse",
            DocumentRole::Quality => "quality",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.tag() == tag)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentRole::SiteManager => "Site Manager",
            DocumentRole::Hse => "HSE Officer",
            DocumentRole::Quality => "Quality Engineer",
        }
    }
}

impl std::fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Closed enumeration of generated document types.
///
/// Serializes as the `resultType` discriminator (`DAILY_SITE_REPORT`), while
/// [`TaskTag::tag`] gives the lowercase classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    // Site manager
    DailySiteReport,
    ProgressReport,
    MaterialRequisition,
    LookAheadSchedule,
    // HSE
    RiskAssessment,
    JobSafetyAnalysis,
    IncidentReport,
    ToolboxTalk,
    PermitToWork,
    // Quality
    InspectionTestPlan,
    NonConformanceReport,
    QualityChecklist,
    MethodStatement,
}

impl DocumentKind {
    pub fn role(&self) -> DocumentRole {
        match self {
            DocumentKind::DailySiteReport
            | DocumentKind::ProgressReport
            | DocumentKind::MaterialRequisition
            | DocumentKind::LookAheadSchedule => DocumentRole::SiteManager,
            DocumentKind::RiskAssessment
            | DocumentKind::JobSafetyAnalysis
            | DocumentKind::IncidentReport
            | DocumentKind::ToolboxTalk
            | DocumentKind::PermitToWork => DocumentRole::Hse,
            DocumentKind::InspectionTestPlan
            | DocumentKind::NonConformanceReport
            | DocumentKind::QualityChecklist
            | DocumentKind::MethodStatement => DocumentRole::Quality,
        }
    }

    /// Document kinds owned by `role`, in declaration order.
    pub fn for_role(role: DocumentRole) -> Vec<DocumentKind> {
        Self::all()
            .iter()
            .copied()
            .filter(|kind| kind.role() == role)
            .collect()
    }

    /// The `resultType` discriminator carried in generated payloads.
    pub fn result_type(&self) -> &'static str {
        match self {
            DocumentKind::DailySiteReport => "DAILY_SITE_REPORT",
            DocumentKind::ProgressReport => "PROGRESS_REPORT",
            DocumentKind::MaterialRequisition => "MATERIAL_REQUISITION",
            DocumentKind::LookAheadSchedule => "LOOK_AHEAD_SCHEDULE",
            DocumentKind::RiskAssessment => "RISK_ASSESSMENT",
            DocumentKind::JobSafetyAnalysis => "JOB_SAFETY_ANALYSIS",
            DocumentKind::IncidentReport => "INCIDENT_REPORT",
            DocumentKind::ToolboxTalk => "TOOLBOX_TALK",
            DocumentKind::PermitToWork => "PERMIT_TO_WORK",
            DocumentKind::InspectionTestPlan => "INSPECTION_TEST_PLAN",
            DocumentKind::NonConformanceReport => "NON_CONFORMANCE_REPORT",
            DocumentKind::QualityChecklist => "QUALITY_CHECKLIST",
            DocumentKind::MethodStatement => "METHOD_STATEMENT",
        }
    }
}

impl TaskTag for DocumentKind {
    fn all() -> &'static [Self] {
        &[
            DocumentKind::DailySiteReport,
            DocumentKind::ProgressReport,
            DocumentKind::MaterialRequisition,
            DocumentKind::LookAheadSchedule,
            DocumentKind::RiskAssessment,
            DocumentKind::JobSafetyAnalysis,
            DocumentKind::IncidentReport,
            DocumentKind::ToolboxTalk,
            DocumentKind::PermitToWork,
            DocumentKind::InspectionTestPlan,
            DocumentKind::NonConformanceReport,
            DocumentKind::QualityChecklist,
            DocumentKind::MethodStatement,
        ]
    }

    fn tag(&self) -> &'static str {
        match self {
            DocumentKind::DailySiteReport => "daily_site_report",
            DocumentKind::ProgressReport => "progress_report",
            DocumentKind::MaterialRequisition => "material_requisition",
            DocumentKind::LookAheadSchedule => "look_ahead_schedule",
            DocumentKind::RiskAssessment => "risk_assessment",
            DocumentKind::JobSafetyAnalysis => "job_safety_analysis",
            DocumentKind::IncidentReport => "incident_report",
            DocumentKind::ToolboxTalk => "toolbox_talk",
            DocumentKind::PermitToWork => "permit_to_work",
            DocumentKind::InspectionTestPlan => "inspection_test_plan",
            DocumentKind::NonConformanceReport => "non_conformance_report",
            DocumentKind::QualityChecklist => "quality_checklist",
            DocumentKind::MethodStatement => "method_statement",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentKind::DailySiteReport => "Daily Site Report",
            DocumentKind::ProgressReport => "Progress Report",
            DocumentKind::MaterialRequisition => "Material Requisition",
            DocumentKind::LookAheadSchedule => "Look-Ahead Schedule",
            DocumentKind::RiskAssessment => "Risk Assessment",
            DocumentKind::JobSafetyAnalysis => "Job Safety Analysis",
            DocumentKind::IncidentReport => "Incident Report",
            DocumentKind::ToolboxTalk => "Toolbox Talk",
            DocumentKind::PermitToWork => "Permit to Work",
            DocumentKind::InspectionTestPlan => "Inspection and Test Plan",
            DocumentKind::NonConformanceReport => "Non-Conformance Report",
            DocumentKind::QualityChecklist => "Quality Checklist",
            DocumentKind::MethodStatement => "Method Statement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_partition_all_kinds() {
        let total: usize = DocumentRole::ALL
            .iter()
            .map(|role| DocumentKind::for_role(*role).len())
            .sum();
        assert_eq!(total, DocumentKind::all().len());
        assert_eq!(DocumentKind::for_role(DocumentRole::SiteManager).len(), 4);
        assert_eq!(DocumentKind::for_role(DocumentRole::Hse).len(), 5);
        assert_eq!(DocumentKind::for_role(DocumentRole::Quality).len(), 4);
    }

    #[test]
    fn result_type_is_screaming_tag() {
        for kind in DocumentKind::all() {
            assert_eq!(kind.result_type(), kind.tag().to_uppercase());
        }
    }

    #[test]
    fn serde_uses_result_type() {
        for kind in DocumentKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.result_type()));
            let back: DocumentKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *kind);
        }
    }

    #[test]
    fn role_tags_resolve() {
        assert_eq!(DocumentRole::from_tag("hse"), Some(DocumentRole::Hse));
        assert_eq!(DocumentRole::from_tag("foreman"), None);
    }
}
