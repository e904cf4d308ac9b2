//! In-memory conversation history

use crate::types::{Message, MessageRole};

/// Ordered, append-only message history for one session.
///
/// System-role entries may be stored here but are never sent in the request's
/// `messages` array; see [`wire_messages`](ConversationState::wire_messages).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages to send, in order, with system-role entries removed.
    pub fn wire_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .cloned()
            .collect()
    }
}
