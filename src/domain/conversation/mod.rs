//! Conversation domain module.
//!
//! Chat transcript messages, user turns and the history builder that feeds
//! prior turns to the model.

mod history;
mod message;
mod turn;

pub use history::{HistoryBuilder, HistoryEntry, HistoryRole};
pub use message::{Author, ConversationMessage, MessageContent};
pub use turn::{InlineImage, UserTurn};
