use crate::context::ReportContext;
use crate::message::{Message, observe_sequence};
use serde::{Deserialize, Serialize};

/// Persistence key for a user's conversation.
pub fn session_key(user_id: &str) -> String {
    format!("user-{user_id}")
}

/// Everything known about one user's conversation.
///
/// The message log only grows; context fields go from unset to set and are not
/// overwritten once known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub context: ReportContext,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), ..Default::default() }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_context(mut self, context: ReportContext) -> Self {
        self.context = context;
        self
    }

    pub fn max_sequence(&self) -> Option<u64> {
        self.messages.iter().map(Message::seq).max()
    }

    /// Registers restored sequence numbers so new messages sort after them.
    pub fn observe_sequences(&self) {
        if let Some(max) = self.max_sequence() {
            observe_sequence(max);
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
