//! DetectIntentHandler - Classify what the user wants from this turn

use crate::application::ai_engine::{ConstrainedClassifier, IntentTaxonomy};
use crate::domain::conversation::{ConversationMessage, HistoryBuilder};
use crate::domain::intent::Intent;
use crate::domain::profile::UserProfile;
use crate::domain::tasks::{DocumentKind, DocumentRole, TaskTag};

/// Command to classify a prompt
#[derive(Debug, Clone)]
pub struct DetectIntentCommand {
    pub prompt: String,
    pub history: Vec<ConversationMessage>,
    pub profile: UserProfile,
    pub trace_id: String,
}

/// Result of intent detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectIntentResult {
    pub intent: Intent,
}

/// Handler for intent detection. Falls back to `Conversation` on any failure.
pub struct DetectIntentHandler {
    classifier: ConstrainedClassifier,
    history: HistoryBuilder,
}

impl DetectIntentHandler {
    pub fn new(classifier: ConstrainedClassifier, history: HistoryBuilder) -> Self {
        Self {
            classifier,
            history,
        }
    }

    pub async fn handle(&self, cmd: DetectIntentCommand) -> DetectIntentResult {
        let mut prompt = cmd.prompt.clone();
        if let Some(snippet) = self.history.last_ai_snippet(&cmd.history) {
            prompt.push_str("\n\nPrevious assistant reply (context only):\n");
            prompt.push_str(&snippet);
        }

        let intent = self
            .classifier
            .classify(
                &IntentTaxonomy,
                &instruction(&cmd.profile),
                &prompt,
                &cmd.trace_id,
                Intent::Conversation,
            )
            .await;
        tracing::info!(trace_id = %cmd.trace_id, intent = intent.tag(), "intent detected");
        DetectIntentResult { intent }
    }
}

fn instruction(profile: &UserProfile) -> String {
    let documents: Vec<String> = DocumentRole::ALL
        .iter()
        .map(|role| {
            let kinds: Vec<&str> = DocumentKind::for_role(*role).iter().map(|k| k.tag()).collect();
            format!("  {} ({}): {}", role.tag(), role.display_name(), kinds.join(", "))
        })
        .collect();
    format!(
        "Classify the request of a construction professional (writing in {}).\n\
         intent:\n\
         - structural: a structural engineering calculation or design check\n\
         - geotechnical: a soil, foundation or slope calculation\n\
         - document_generation: a site, HSE or quality document to produce\n\
         - conversation: anything else, including questions about codes or methods\n\
         role and documentType apply to document_generation only, otherwise \"none\":\n{}\n\
         sufficientData is false only when a calculation is requested without the \
         numeric values it needs.\n\
         Use the previous assistant reply to resolve short follow-ups. Answer with JSON only.",
        profile.language,
        documents.join("\n")
    )
}
