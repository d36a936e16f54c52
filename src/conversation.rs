use crate::events::Message;

/// Append-only, insertion-ordered list of messages
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutation point of the store
    pub fn append(&mut self, message: Message) {
        tracing::debug!(
            id = %message.id,
            role = message.role.display_name(),
            chars = message.content.chars().count(),
            "message appended"
        );
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
