//! Capability gate.
//!
//! Static table mapping each gated feature to the minimum engine tier that
//! may use it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::EngineTier;

/// A feature of the orchestration core that is gated by engine tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Structured hazard/quality analysis of a site photo.
    ImageAnalysis,
    /// Multi-turn conversation about a previously shared image.
    VisualFollowUp,
    /// Structural engineering calculation.
    StructuralCalculation,
    /// Geotechnical engineering calculation.
    GeotechnicalCalculation,
    /// Compliance document generation.
    DocumentGeneration,
    /// Free conversation.
    Conversation,
    /// Retrieval context injected into conversation.
    RagInjection,
}

impl Capability {
    /// Every gated capability.
    pub const ALL: [Capability; 7] = [
        Capability::ImageAnalysis,
        Capability::VisualFollowUp,
        Capability::StructuralCalculation,
        Capability::GeotechnicalCalculation,
        Capability::DocumentGeneration,
        Capability::Conversation,
        Capability::RagInjection,
    ];

    /// Minimum tier required for this capability.
    ///
    /// | Capability | Minimum tier |
    /// |------------|--------------|
    /// | ImageAnalysis | Premium |
    /// | VisualFollowUp | Premium |
    /// | StructuralCalculation | Premium |
    /// | GeotechnicalCalculation | Premium |
    /// | DocumentGeneration | Compact |
    /// | Conversation | Compact |
    /// | RagInjection | Premium |
    pub fn minimum_tier(&self) -> EngineTier {
        match self {
            Capability::ImageAnalysis
            | Capability::VisualFollowUp
            | Capability::StructuralCalculation
            | Capability::GeotechnicalCalculation
            | Capability::RagInjection => EngineTier::Premium,
            Capability::DocumentGeneration | Capability::Conversation => EngineTier::Compact,
        }
    }

    /// Human-readable feature name used in denial messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Capability::ImageAnalysis => "Image analysis",
            Capability::VisualFollowUp => "Visual follow-up",
            Capability::StructuralCalculation => "Structural calculation",
            Capability::GeotechnicalCalculation => "Geotechnical calculation",
            Capability::DocumentGeneration => "Document generation",
            Capability::Conversation => "Conversation",
            Capability::RagInjection => "Document-grounded answers",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Denial from the capability gate. Terminal for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{capability} requires the {required} engine (current: {current})")]
pub struct CapabilityDenied {
    pub capability: Capability,
    pub required: EngineTier,
    pub current: EngineTier,
}

/// Checks capabilities against the static tier table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityGate;

impl CapabilityGate {
    /// Returns `Ok(())` if `tier` may use `capability`.
    pub fn check(&self, capability: Capability, tier: EngineTier) -> Result<(), CapabilityDenied> {
        let required = capability.minimum_tier();
        if tier.satisfies(required) {
            Ok(())
        } else {
            Err(CapabilityDenied {
                capability,
                required,
                current: tier,
            })
        }
    }

    /// Returns true if `tier` may use `capability`.
    pub fn allows(&self, capability: Capability, tier: EngineTier) -> bool {
        self.check(capability, tier).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_tier() -> impl Strategy<Value = EngineTier> {
        prop::sample::select(EngineTier::ALL.to_vec())
    }

    fn any_capability() -> impl Strategy<Value = Capability> {
        prop::sample::select(Capability::ALL.to_vec())
    }

    #[test]
    fn image_analysis_denied_on_advanced() {
        let err = CapabilityGate
            .check(Capability::ImageAnalysis, EngineTier::Advanced)
            .unwrap_err();

        assert_eq!(err.required, EngineTier::Premium);
        assert_eq!(err.current, EngineTier::Advanced);
        assert_eq!(
            err.to_string(),
            "Image analysis requires the Premium engine (current: Advanced)"
        );
    }

    #[test]
    fn document_generation_allowed_on_every_tier() {
        for tier in EngineTier::ALL {
            assert!(CapabilityGate.allows(Capability::DocumentGeneration, tier));
        }
    }

    #[test]
    fn calculations_require_premium() {
        assert!(!CapabilityGate.allows(Capability::StructuralCalculation, EngineTier::Advanced));
        assert!(!CapabilityGate.allows(Capability::GeotechnicalCalculation, EngineTier::Compact));
        assert!(CapabilityGate.allows(Capability::StructuralCalculation, EngineTier::Premium));
    }

    #[test]
    fn rag_is_premium_only() {
        assert!(!CapabilityGate.allows(Capability::RagInjection, EngineTier::Advanced));
        assert!(CapabilityGate.allows(Capability::RagInjection, EngineTier::Premium));
    }

    proptest! {
        #[test]
        fn denial_is_monotonic(capability in any_capability(), high in any_tier(), low in any_tier()) {
            prop_assume!(low <= high);
            if !CapabilityGate.allows(capability, high) {
                prop_assert!(!CapabilityGate.allows(capability, low));
            }
        }

        #[test]
        fn denial_names_the_table_tier(capability in any_capability(), tier in any_tier()) {
            if let Err(denied) = CapabilityGate.check(capability, tier) {
                prop_assert_eq!(denied.required, capability.minimum_tier());
                prop_assert!(denied.current < denied.required);
            }
        }
    }
}
