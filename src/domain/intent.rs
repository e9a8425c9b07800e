//! Classified purpose of a user turn.

use serde::{Deserialize, Serialize};

use super::engine::Capability;
use super::tasks::{AgentKind, DocumentKind, DocumentRole, TaskTag};

/// What the user wants from this turn.
///
/// Only the calculation variants store `sufficient_data`; every other
/// variant reports `true` through [`Intent::sufficient_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Structural {
        sufficient_data: bool,
    },
    Geotechnical {
        sufficient_data: bool,
    },
    DocumentGeneration {
        role: DocumentRole,
        document_type: Option<DocumentKind>,
    },
    Conversation,
}

impl Intent {
    pub const TAGS: [&'static str; 4] = [
        "structural",
        "geotechnical",
        "document_generation",
        "conversation",
    ];

    /// Builds an intent from the raw classifier fields.
    ///
    /// Returns `None` when the intent label is unknown. A document request
    /// without a resolvable role degrades to `Conversation`; a document type
    /// that does not belong to the role is dropped.
    pub fn resolve(
        intent: &str,
        role: Option<&str>,
        document_type: Option<&str>,
        sufficient_data: Option<bool>,
    ) -> Option<Intent> {
        let sufficient_data = sufficient_data.unwrap_or(true);
        match intent.trim() {
            "structural" => Some(Intent::Structural { sufficient_data }),
            "geotechnical" => Some(Intent::Geotechnical { sufficient_data }),
            "conversation" => Some(Intent::Conversation),
            "document_generation" => {
                let Some(role) = role.and_then(DocumentRole::from_tag) else {
                    return Some(Intent::Conversation);
                };
                let document_type = document_type
                    .and_then(DocumentKind::from_tag)
                    .filter(|kind| kind.role() == role);
                Some(Intent::DocumentGeneration {
                    role,
                    document_type,
                })
            }
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Intent::Structural { .. } => "structural",
            Intent::Geotechnical { .. } => "geotechnical",
            Intent::DocumentGeneration { .. } => "document_generation",
            Intent::Conversation => "conversation",
        }
    }

    pub fn sufficient_data(&self) -> bool {
        match self {
            Intent::Structural { sufficient_data } | Intent::Geotechnical { sufficient_data } => {
                *sufficient_data
            }
            Intent::DocumentGeneration { .. } | Intent::Conversation => true,
        }
    }

    /// Capability the gate checks before routing.
    pub fn capability(&self) -> Capability {
        match self {
            Intent::Structural { .. } => Capability::StructuralCalculation,
            Intent::Geotechnical { .. } => Capability::GeotechnicalCalculation,
            Intent::DocumentGeneration { .. } => Capability::DocumentGeneration,
            Intent::Conversation => Capability::Conversation,
        }
    }

    /// Level-one routing target.
    pub fn agent(&self) -> AgentKind {
        match self {
            Intent::Structural { .. } => AgentKind::Structural,
            Intent::Geotechnical { .. } => AgentKind::Geotechnical,
            Intent::DocumentGeneration { role, .. } => AgentKind::from(*role),
            Intent::Conversation => AgentKind::Conversational,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_calculation_intents_with_sufficiency() {
        assert_eq!(
            Intent::resolve("structural", None, None, Some(false)),
            Some(Intent::Structural { sufficient_data: false })
        );
        assert_eq!(
            Intent::resolve("geotechnical", None, None, None),
            Some(Intent::Geotechnical { sufficient_data: true })
        );
    }

    #[test]
    fn document_without_role_degrades_to_conversation() {
        assert_eq!(
            Intent::resolve("document_generation", None, Some("daily_site_report"), Some(true)),
            Some(Intent::Conversation)
        );
        assert_eq!(
            Intent::resolve("document_generation", Some("architect"), None, None),
            Some(Intent::Conversation)
        );
    }

    #[test]
    fn mismatched_document_type_keeps_role() {
        assert_eq!(
            Intent::resolve("document_generation", Some("hse"), Some("daily_site_report"), None),
            Some(Intent::DocumentGeneration {
                role: DocumentRole::Hse,
                document_type: None
            })
        );
        assert_eq!(
            Intent::resolve("document_generation", Some("hse"), Some("toolbox_talk"), None),
            Some(Intent::DocumentGeneration {
                role: DocumentRole::Hse,
                document_type: Some(DocumentKind::ToolboxTalk)
            })
        );
    }

    #[test]
    fn unknown_label_is_unresolved() {
        assert_eq!(Intent::resolve("weather", None, None, None), None);
    }

    #[test]
    fn agents_follow_intent() {
        let doc = Intent::DocumentGeneration {
            role: DocumentRole::Quality,
            document_type: None,
        };
        assert_eq!(doc.agent(), AgentKind::Quality);
        assert_eq!(doc.capability(), Capability::DocumentGeneration);
        assert_eq!(Intent::Conversation.agent(), AgentKind::Conversational);
    }

    proptest! {
        #[test]
        fn non_calculation_intents_are_always_sufficient(
            label in prop::sample::select(vec!["document_generation", "conversation"]),
            role in prop::option::of(prop::sample::select(vec!["site_manager", "hse", "quality", "x"])),
            sufficient in prop::option::of(any::<bool>()),
        ) {
            let intent = Intent::resolve(label, role, None, sufficient).unwrap();
            prop_assert!(intent.sufficient_data());
        }
    }
}
