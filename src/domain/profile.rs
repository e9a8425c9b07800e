//! Caller-supplied user and project settings.

use serde::{Deserialize, Serialize};

use super::engine::EngineTier;

/// Per-user settings that shape every generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Language the answer must be written in, e.g. `English`, `Türkçe`.
    pub language: String,
    /// Design code calculations follow, e.g. `Eurocode`, `ACI 318`.
    pub calculation_standard: String,
    pub engine_tier: EngineTier,
}

impl UserProfile {
    pub fn new(
        language: impl Into<String>,
        calculation_standard: impl Into<String>,
        engine_tier: EngineTier,
    ) -> Self {
        Self {
            language: language.into(),
            calculation_standard: calculation_standard.into(),
            engine_tier,
        }
    }

    pub fn with_tier(&self, engine_tier: EngineTier) -> Self {
        Self {
            engine_tier,
            ..self.clone()
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new("English", "Eurocode", EngineTier::Compact)
    }
}

/// Project details appended to document prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub project_name: Option<String>,
    pub location: Option<String>,
    pub client: Option<String>,
    pub contractor: Option<String>,
    pub notes: Option<String>,
}

impl ProjectContext {
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Project", &self.project_name),
            ("Location", &self.location),
            ("Client", &self.client),
            ("Contractor", &self.contractor),
            ("Notes", &self.notes),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
    }

    /// Renders the non-empty fields as a prompt block.
    pub fn to_prompt_block(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .entries()
            .map(|(label, value)| format!("- {}: {}", label, value))
            .collect();
        Some(format!("PROJECT CONTEXT:\n{}", lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_renders_nothing() {
        let ctx = ProjectContext {
            notes: Some("   ".into()),
            ..Default::default()
        };
        assert!(ctx.is_empty());
        assert_eq!(ctx.to_prompt_block(), None);
    }

    #[test]
    fn prompt_block_lists_present_fields_in_order() {
        let ctx = ProjectContext {
            project_name: Some("Harbor Tower".into()),
            contractor: Some("Acme Build".into()),
            ..Default::default()
        };
        assert_eq!(
            ctx.to_prompt_block().unwrap(),
            "PROJECT CONTEXT:\n- Project: Harbor Tower\n- Contractor: Acme Build"
        );
    }

    #[test]
    fn with_tier_keeps_other_settings() {
        let profile = UserProfile::new("Deutsch", "DIN", EngineTier::Compact);
        let premium = profile.with_tier(EngineTier::Premium);
        assert_eq!(premium.language, "Deutsch");
        assert_eq!(premium.engine_tier, EngineTier::Premium);
    }
}
