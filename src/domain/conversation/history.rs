//! Conversation history windowing and serialization.
//!
//! Turns the caller's transcript into the role/text pairs sent to the model.
//! The window is a pure function of the transcript, so applying it twice
//! yields the same result.

use serde::{Deserialize, Serialize};

use super::{Author, ConversationMessage};

/// Role of a history entry as seen by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRole {
    User,
    Model,
}

/// One serialized prior turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

/// Builds model history from a transcript.
#[derive(Debug, Clone, Copy)]
pub struct HistoryBuilder {
    snippet_chars: usize,
}

impl HistoryBuilder {
    pub fn new(snippet_chars: usize) -> Self {
        Self { snippet_chars }
    }

    /// Selects the messages that count as completed prior turns.
    ///
    /// Drops AI messages before the first user message, typing slots, and
    /// the trailing in-flight suffix of unanswered user messages.
    pub fn window(messages: &[ConversationMessage]) -> Vec<ConversationMessage> {
        let settled = messages
            .iter()
            .skip_while(|m| m.author() == Author::Ai)
            .filter(|m| !m.is_typing());

        let mut window: Vec<ConversationMessage> = settled.cloned().collect();
        while window.last().map(|m| m.is_user()).unwrap_or(false) {
            window.pop();
        }
        window
    }

    /// Serializes the windowed transcript, preserving order.
    pub fn build(&self, messages: &[ConversationMessage]) -> Vec<HistoryEntry> {
        Self::window(messages)
            .iter()
            .map(|m| HistoryEntry {
                role: match m.author() {
                    Author::User => HistoryRole::User,
                    Author::Ai => HistoryRole::Model,
                },
                text: m.content().digest(),
            })
            .collect()
    }

    /// Text of the latest finished AI message, cut to the snippet length.
    ///
    /// Used as trailing context for intent classification.
    pub fn last_ai_snippet(&self, messages: &[ConversationMessage]) -> Option<String> {
        messages
            .iter()
            .rev()
            .find(|m| m.is_ai() && !m.is_typing())
            .map(|m| truncate_chars(&m.content().digest(), self.snippet_chars))
            .filter(|s| !s.is_empty())
    }
}

impl Default for HistoryBuilder {
    fn default() -> Self {
        Self::new(500)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageContent;
    use proptest::prelude::*;

    fn ai(text: &str) -> ConversationMessage {
        ConversationMessage::ai(MessageContent::text(text))
    }

    fn texts(entries: &[HistoryEntry]) -> Vec<(&HistoryRole, &str)> {
        entries.iter().map(|e| (&e.role, e.text.as_str())).collect()
    }

    #[test]
    fn drops_greeting_placeholder_and_in_flight_turn() {
        let transcript = vec![
            ai("Hello, how can I help on site today?"),
            ConversationMessage::user("What cover for a footing?"),
            ai("75 mm against earth."),
            ConversationMessage::user("And for slabs?"),
            ConversationMessage::typing(),
        ];

        let history = HistoryBuilder::default().build(&transcript);
        assert_eq!(
            texts(&history),
            vec![
                (&HistoryRole::User, "What cover for a footing?"),
                (&HistoryRole::Model, "75 mm against earth."),
            ]
        );
    }

    #[test]
    fn trailing_unanswered_users_count_as_in_flight() {
        let transcript = vec![
            ConversationMessage::user("first"),
            ai("answer"),
            ConversationMessage::user("second"),
            ConversationMessage::user("third"),
        ];
        let window = HistoryBuilder::window(&transcript);
        assert_eq!(window.len(), 2);
        assert!(window.last().map(|m| m.is_ai()).unwrap_or(false));
    }

    #[test]
    fn empty_and_ai_only_transcripts_yield_nothing() {
        assert!(HistoryBuilder::window(&[]).is_empty());
        assert!(HistoryBuilder::window(&[ai("hi"), ai("still me")]).is_empty());
    }

    #[test]
    fn snippet_skips_typing_and_truncates() {
        let transcript = vec![
            ConversationMessage::user("q"),
            ai("abcdefghij"),
            ConversationMessage::typing(),
        ];
        let builder = HistoryBuilder::new(4);
        assert_eq!(builder.last_ai_snippet(&transcript), Some("abcd".to_string()));
        assert_eq!(builder.last_ai_snippet(&[ConversationMessage::user("q")]), None);
    }

    #[test]
    fn snippet_truncates_on_char_boundaries() {
        let transcript = vec![ai("çelik kiriş")];
        assert_eq!(
            HistoryBuilder::new(3).last_ai_snippet(&transcript),
            Some("çel".to_string())
        );
    }

    fn arb_message() -> impl Strategy<Value = ConversationMessage> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(ConversationMessage::user),
            "[a-z]{1,8}".prop_map(|t| ConversationMessage::ai(MessageContent::text(t))),
            Just(()).prop_map(|_| ConversationMessage::typing()),
        ]
    }

    proptest! {
        #[test]
        fn windowing_is_idempotent(transcript in prop::collection::vec(arb_message(), 0..16)) {
            let once = HistoryBuilder::window(&transcript);
            let twice = HistoryBuilder::window(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn window_is_an_ordered_subsequence(transcript in prop::collection::vec(arb_message(), 0..16)) {
            let window = HistoryBuilder::window(&transcript);
            let mut source = transcript.iter();
            for msg in &window {
                prop_assert!(source.any(|m| m.id() == msg.id()));
                prop_assert!(!msg.is_typing());
            }
            if let Some(first) = window.first() {
                prop_assert!(first.is_user());
            }
            if let Some(last) = window.last() {
                prop_assert!(last.is_ai());
            }
        }
    }
}
