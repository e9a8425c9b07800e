//! Message entity for the chat transcript.
//!
//! Messages are owned by the caller. The core only reads them when building
//! history and never mutates them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};
use crate::domain::payload::{AnalysisSummary, CalculationPayload, DocumentPayload};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Ai,
}

/// Content of a message, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Analysis(AnalysisSummary),
    Calculation(CalculationPayload),
    Document(DocumentPayload),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }

    /// Plain text for text content, a one-line digest for structured payloads.
    pub fn digest(&self) -> String {
        match self {
            MessageContent::Text { text } => text.clone(),
            MessageContent::Analysis(summary) => summary.digest(),
            MessageContent::Calculation(payload) => payload.digest(),
            MessageContent::Document(payload) => payload.digest(),
        }
    }
}

/// A message in the chat transcript.
///
/// # Invariants
///
/// - `is_typing` goes from `true` to `false` at most once, through [`complete`](Self::complete)
/// - only AI messages are ever typing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    id: MessageId,
    timestamp: Timestamp,
    author: Author,
    is_typing: bool,
    content: MessageContent,
}

impl ConversationMessage {
    /// Creates a user text message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::finished(Author::User, MessageContent::text(text))
    }

    /// Creates a finished AI message.
    pub fn ai(content: MessageContent) -> Self {
        Self::finished(Author::Ai, content)
    }

    /// Creates the AI slot shown while a response is being generated.
    pub fn typing() -> Self {
        Self {
            id: MessageId::new(),
            timestamp: Timestamp::now(),
            author: Author::Ai,
            is_typing: true,
            content: MessageContent::text(""),
        }
    }

    /// Reconstitutes a message from caller-held state (no validation).
    pub fn reconstitute(
        id: MessageId,
        timestamp: Timestamp,
        author: Author,
        is_typing: bool,
        content: MessageContent,
    ) -> Self {
        Self {
            id,
            timestamp,
            author,
            is_typing,
            content,
        }
    }

    fn finished(author: Author, content: MessageContent) -> Self {
        Self {
            id: MessageId::new(),
            timestamp: Timestamp::now(),
            author,
            is_typing: false,
            content,
        }
    }

    /// Fills a typing slot with its final content.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the message is not typing
    pub fn complete(&mut self, content: MessageContent) -> Result<(), ValidationError> {
        if !self.is_typing {
            return Err(ValidationError::invalid_transition("Finished", "Completed"));
        }
        self.is_typing = false;
        self.content = content;
        Ok(())
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    pub fn is_ai(&self) -> bool {
        self.author == Author::Ai
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::fixtures::beam_result_json;
    use serde_json::json;

    #[test]
    fn typing_slot_completes_once() {
        let mut msg = ConversationMessage::typing();
        assert!(msg.is_typing());
        assert!(msg.is_ai());

        msg.complete(MessageContent::text("Done")).unwrap();
        assert!(!msg.is_typing());
        assert_eq!(msg.content().digest(), "Done");

        assert!(msg.complete(MessageContent::text("Again")).is_err());
        assert_eq!(msg.content().digest(), "Done");
    }

    #[test]
    fn completing_finished_message_fails() {
        let mut msg = ConversationMessage::user("hello");
        assert!(matches!(
            msg.complete(MessageContent::text("x")),
            Err(ValidationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn content_serializes_with_kind_tag() {
        let text = serde_json::to_value(MessageContent::text("hi")).unwrap();
        assert_eq!(text, json!({"kind": "text", "text": "hi"}));

        let calc = MessageContent::Calculation(CalculationPayload {
            task: "Beam Design".into(),
            result: serde_json::from_value(beam_result_json()).unwrap(),
        });
        let value = serde_json::to_value(&calc).unwrap();
        assert_eq!(value["kind"], "calculation");
        assert_eq!(value["task"], "Beam Design");

        let back: MessageContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, calc);
    }

    #[test]
    fn message_serializes_camel_case() {
        let msg = ConversationMessage::typing();
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["isTyping"], true);
        assert_eq!(value["author"], "ai");
    }
}
