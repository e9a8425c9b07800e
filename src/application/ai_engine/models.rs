use serde::{Deserialize, Serialize};

use crate::domain::engine::EngineTier;

/// Model override per engine tier. `None` keeps the provider default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierModels {
    pub compact: Option<String>,
    pub advanced: Option<String>,
    pub premium: Option<String>,
}

impl TierModels {
    pub fn for_tier(&self, tier: EngineTier) -> Option<String> {
        match tier {
            EngineTier::Compact => self.compact.clone(),
            EngineTier::Advanced => self.advanced.clone(),
            EngineTier::Premium => self.premium.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_model_for_tier() {
        let models = TierModels {
            compact: Some("gpt-4o-mini".into()),
            advanced: None,
            premium: Some("gpt-4o".into()),
        };
        assert_eq!(models.for_tier(EngineTier::Premium).as_deref(), Some("gpt-4o"));
        assert_eq!(models.for_tier(EngineTier::Advanced), None);
    }
}
