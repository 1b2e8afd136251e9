use crate::message::{Message, Role, WireMessage};

/// An ordered, append-only chat history.
///
/// The only permitted mutation besides appending is the live trailing
/// assistant message, which accumulates streamed text until it is finalized.
/// At most one message is live at a time.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    /// Id of the in-progress assistant message, if any.
    live: Option<u64>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns true while an assistant message is still accumulating text.
    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Appends a user message and returns its id.
    pub fn push_user(&mut self, content: impl Into<String>) -> u64 {
        let id = self.alloc_id();
        self.messages.push(Message::new(id, Role::User, content));
        id
    }

    /// Appends a finalized assistant message and returns its id.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> u64 {
        let id = self.alloc_id();
        self.messages
            .push(Message::new(id, Role::Assistant, content));
        id
    }

    /// Appends an empty assistant placeholder and marks it live.
    ///
    /// Returns `None` when another assistant message is already live.
    pub fn begin_assistant(&mut self) -> Option<u64> {
        if self.live.is_some() {
            return None;
        }
        let id = self.alloc_id();
        self.messages.push(Message::new(id, Role::Assistant, ""));
        self.live = Some(id);
        Some(id)
    }

    fn live_message(&mut self) -> Option<&mut Message> {
        let id = self.live?;
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }

    /// Appends text to the live assistant message. No-op when nothing is live.
    pub fn append_live(&mut self, text: &str) {
        if let Some(msg) = self.live_message() {
            msg.content.push_str(text);
        }
    }

    /// Replaces the live assistant message's content (used for the error
    /// notice). No-op when nothing is live.
    pub fn set_live(&mut self, text: &str) {
        if let Some(msg) = self.live_message() {
            msg.content = text.to_string();
        }
    }

    /// Finalizes the live assistant message. Idempotent.
    pub fn finish_live(&mut self) {
        self.live = None;
    }

    /// Returns the conversation as `{role, content}` pairs for the relay.
    pub fn wire_messages(&self) -> Vec<WireMessage> {
        self.messages.iter().map(WireMessage::from).collect()
    }
}
