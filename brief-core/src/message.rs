//! Chat messages exchanged between the user, the model and tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static LAST_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Returns a fresh message sequence number.
///
/// Numbers are strictly increasing within the process. They are seeded from the wall
/// clock in microseconds, so messages created after a restart still sort after the
/// messages restored from a checkpoint.
pub fn next_sequence() -> u64 {
    let now = u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0);
    let mut current = LAST_SEQUENCE.load(Ordering::Relaxed);
    loop {
        let next = now.max(current + 1);
        match LAST_SEQUENCE.compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => current = actual,
        }
    }
}

/// Makes sure every sequence number handed out from now on is greater than `seq`.
pub fn observe_sequence(seq: u64) {
    LAST_SEQUENCE.fetch_max(seq, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self { id: id.into(), name: name.into(), args }
    }
}

/// One turn of a conversation.
///
/// Messages are immutable once created and ordered by their sequence number, which the
/// message reducer also uses as identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "user")]
    Human { seq: u64, content: String },
    #[serde(rename = "assistant")]
    Ai {
        seq: u64,
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    #[serde(rename = "tool")]
    Tool { seq: u64, content: String, tool_name: String, tool_call_id: String },
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human { seq: next_sequence(), content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Message::Ai { seq: next_sequence(), content: content.into(), tool_calls: Vec::new() }
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Ai { seq: next_sequence(), content: content.into(), tool_calls }
    }

    pub fn tool(
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            seq: next_sequence(),
            content: content.into(),
            tool_name: tool_name.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Message::Human { seq, .. } | Message::Ai { seq, .. } | Message::Tool { seq, .. } => {
                *seq
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::Human { .. } => Role::User,
            Message::Ai { .. } => Role::Assistant,
            Message::Tool { .. } => Role::Tool,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::Human { content, .. }
            | Message::Ai { content, .. }
            | Message::Tool { content, .. } => content,
        }
    }

    /// Tool calls carried by an assistant message; empty for every other role.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Ai { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Message::Human { .. })
    }

    /// True for an assistant message that requests no tools.
    pub fn is_final_answer(&self) -> bool {
        matches!(self, Message::Ai { tool_calls, .. } if tool_calls.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_strictly_increasing() {
        let a = next_sequence();
        let b = next_sequence();
        let c = next_sequence();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_observe_sequence_moves_generator_forward() {
        let far = next_sequence() + 1_000_000_000_000;
        observe_sequence(far);
        assert!(next_sequence() > far);
    }

    #[test]
    fn test_role_tagged_serialization() {
        let msg = Message::ai_with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "gather_data_tool", json!({}))],
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["tool_calls"][0]["name"], "gather_data_tool");

        let human: Message =
            serde_json::from_value(json!({"role": "user", "seq": 7, "content": "hi"})).unwrap();
        assert_eq!(human, Message::Human { seq: 7, content: "hi".into() });
        assert_eq!(human.role().as_str(), "user");
    }

    #[test]
    fn test_accessors() {
        let tool = Message::tool("min_tool", "call_9", r#"{"min_value": 3}"#);
        assert_eq!(tool.role(), Role::Tool);
        assert!(tool.tool_calls().is_empty());
        assert!(!tool.is_final_answer());
        assert!(Message::ai("done").is_final_answer());
    }
}
