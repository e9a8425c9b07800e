//! Engine tier definitions.
//!
//! The engine tier is supplied by caller configuration and decides which
//! features of the orchestration core are available for a turn.

use serde::{Deserialize, Serialize};

/// Capability level of the generation engine.
///
/// Ordered: `Compact < Advanced < Premium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineTier {
    /// Fast, low-cost engine. Conversation and document generation only.
    Compact,

    /// Mid-range engine.
    Advanced,

    /// Full engine.
    /// - Image analysis and visual follow-up
    /// - Structural and geotechnical calculations
    /// - Retrieval-augmented conversation
    Premium,
}

impl EngineTier {
    /// All tiers, lowest first.
    pub const ALL: [EngineTier; 3] = [EngineTier::Compact, EngineTier::Advanced, EngineTier::Premium];

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineTier::Compact => "Compact",
            EngineTier::Advanced => "Advanced",
            EngineTier::Premium => "Premium",
        }
    }

    /// Returns the numeric rank of this tier for comparison.
    pub fn rank(&self) -> u8 {
        match self {
            EngineTier::Compact => 0,
            EngineTier::Advanced => 1,
            EngineTier::Premium => 2,
        }
    }

    /// Returns true if this tier is at least `other`.
    pub fn satisfies(&self, required: EngineTier) -> bool {
        self.rank() >= required.rank()
    }
}

impl std::fmt::Display for EngineTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_rank() {
        assert!(EngineTier::Compact < EngineTier::Advanced);
        assert!(EngineTier::Advanced < EngineTier::Premium);
        for pair in EngineTier::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn premium_satisfies_every_tier() {
        for tier in EngineTier::ALL {
            assert!(EngineTier::Premium.satisfies(tier));
        }
    }

    #[test]
    fn compact_only_satisfies_itself() {
        assert!(EngineTier::Compact.satisfies(EngineTier::Compact));
        assert!(!EngineTier::Compact.satisfies(EngineTier::Advanced));
        assert!(!EngineTier::Compact.satisfies(EngineTier::Premium));
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&EngineTier::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
    }

    #[test]
    fn tier_deserializes_from_lowercase() {
        let tier: EngineTier = serde_json::from_str("\"premium\"").unwrap();
        assert_eq!(tier, EngineTier::Premium);
    }
}
