use serde::{Deserialize, Serialize};

use super::DocumentRole;

/// Level-one routing target: one agent per professional discipline,
/// plus the conversational and visual agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Structural,
    Geotechnical,
    SiteManager,
    Hse,
    Quality,
    Conversational,
    Copilot,
    Analysis,
}

impl AgentKind {
    /// Name used in prompts and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Structural => "structural engineering",
            AgentKind::Geotechnical => "geotechnical engineering",
            AgentKind::SiteManager => "site management",
            AgentKind::Hse => "health, safety and environment",
            AgentKind::Quality => "quality control",
            AgentKind::Conversational => "conversation",
            AgentKind::Copilot => "visual co-pilot",
            AgentKind::Analysis => "site image analysis",
        }
    }
}

impl From<DocumentRole> for AgentKind {
    fn from(role: DocumentRole) -> Self {
        match role {
            DocumentRole::SiteManager => AgentKind::SiteManager,
            DocumentRole::Hse => AgentKind::Hse,
            DocumentRole::Quality => AgentKind::Quality,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
