use brief_core::{Result, Tool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const THOUGHT_TOOL_NAME: &str = "notify_thought_tool";

/// Where in the run a thought belongs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtStage {
    Initial,
    #[default]
    Thought,
    Final,
}

impl ThoughtStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThoughtStage::Initial => "initial",
            ThoughtStage::Thought => "thought",
            ThoughtStage::Final => "final",
        }
    }

    /// Unknown or missing stage tags read as a plain thought.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("initial") => ThoughtStage::Initial,
            Some("final") => ThoughtStage::Final,
            _ => ThoughtStage::Thought,
        }
    }
}

/// A progress note the supervisor publishes through [`NotifyThoughtTool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThoughtNote {
    pub stage: ThoughtStage,
    pub text: String,
}

impl ThoughtNote {
    /// Reads the note from the arguments of a thought tool call: `{"thought", "stage"?}`.
    pub fn from_call_args(args: &Value) -> Option<Self> {
        let text = args.get("thought")?.as_str()?.trim();
        if text.is_empty() {
            return None;
        }
        let stage = ThoughtStage::parse(args.get("stage").and_then(Value::as_str));
        Some(Self { stage, text: text.to_string() })
    }

    /// Reads the note from the thought tool's result: `{"event", "content"}`.
    pub fn from_tool_result(content: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(content).ok()?;
        let text = value.get("content")?.as_str()?.trim();
        if text.is_empty() {
            return None;
        }
        let stage = ThoughtStage::parse(value.get("event").and_then(Value::as_str));
        Some(Self { stage, text: text.to_string() })
    }
}

/// Lets the model publish progress notes to the user while it works.
pub struct NotifyThoughtTool;

#[async_trait]
impl Tool for NotifyThoughtTool {
    fn name(&self) -> &str {
        THOUGHT_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Share a short progress note with the user. Use stage 'initial' for the first note \
         of a run and 'thought' for every step after it."
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "thought": {"type": "string", "description": "What you are doing now"},
                "stage": {"type": "string", "enum": ["initial", "thought", "final"]}
            },
            "required": ["thought"]
        }))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let stage = ThoughtStage::parse(args.get("stage").and_then(Value::as_str));
        let thought = args.get("thought").and_then(Value::as_str).unwrap_or_default();
        Ok(json!({"event": stage.as_str(), "content": thought}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tool_result_round_trips_through_note() {
        let result = NotifyThoughtTool
            .execute(json!({"thought": "Collecting Q1 numbers", "stage": "initial"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"event": "initial", "content": "Collecting Q1 numbers"}));

        let note = ThoughtNote::from_tool_result(&result.to_string()).unwrap();
        assert_eq!(note.stage, ThoughtStage::Initial);
        assert_eq!(note.text, "Collecting Q1 numbers");
    }

    #[test]
    fn test_stage_defaults_to_thought() {
        let note = ThoughtNote::from_call_args(&json!({"thought": "Checking totals"})).unwrap();
        assert_eq!(note.stage, ThoughtStage::Thought);

        let note =
            ThoughtNote::from_call_args(&json!({"thought": "x", "stage": "whatever"})).unwrap();
        assert_eq!(note.stage, ThoughtStage::Thought);
    }

    #[test]
    fn test_blank_notes_are_ignored() {
        assert!(ThoughtNote::from_call_args(&json!({"thought": "   "})).is_none());
        assert!(ThoughtNote::from_call_args(&json!({})).is_none());
        assert!(ThoughtNote::from_tool_result("not json").is_none());
    }
}
