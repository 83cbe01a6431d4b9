//! Conversation UI components for the chat interface

pub mod composer;
pub mod history;
pub mod indicator;
pub mod manager;

pub use composer::{ComposerResult, ConversationComposer};
pub use history::{ConversationHistory, HistoryState};
pub use indicator::LoadingIndicator;
pub use manager::{ConversationAction, ConversationManager};
