//! Conversation UI components for the chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod loading;
pub mod manager;

pub use commands::{SlashCommand, get_help_text, parse_slash_command};
pub use composer::ConversationComposer;
pub use history::ConversationHistory;
pub use loading::LoadingIndicator;
pub use manager::{ConversationAction, ConversationManager};
