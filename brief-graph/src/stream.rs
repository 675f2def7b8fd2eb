//! Events emitted while a conversation turn runs

use brief_core::{ConversationState, Message};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    NodeStart { node: String, step: usize },

    NodeEnd { node: String, step: usize, duration_ms: u64 },

    /// A message a node added to the conversation, in the order it was produced.
    Message { node: String, message: Message },

    /// The turn finished; `state` is what was committed last.
    Done { state: ConversationState, total_steps: usize },
}

impl StreamEvent {
    pub fn node_start(node: &str, step: usize) -> Self {
        Self::NodeStart { node: node.to_string(), step }
    }

    pub fn node_end(node: &str, step: usize, duration_ms: u64) -> Self {
        Self::NodeEnd { node: node.to_string(), step, duration_ms }
    }

    pub fn message(node: &str, message: Message) -> Self {
        Self::Message { node: node.to_string(), message }
    }

    pub fn done(state: ConversationState, total_steps: usize) -> Self {
        Self::Done { state, total_steps }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message { message, .. } => Some(message),
            _ => None,
        }
    }
}
