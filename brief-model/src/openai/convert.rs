//! Wire types for the chat completions API and conversion to and from brief types.

use brief_core::{FinishReason, LlmResponse, Message, ToolCall, ToolDeclaration, UsageMetadata};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub delta: Option<DeltaMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeltaMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<DeltaToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaToolCall {
    pub index: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<DeltaFunction>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeltaFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<Usage> for UsageMetadata {
    fn from(u: Usage) -> Self {
        UsageMetadata {
            prompt_token_count: u.prompt_tokens,
            candidates_token_count: u.completion_tokens,
            total_token_count: u.total_tokens,
        }
    }
}

/// Builds the wire message list: optional system prompt first, then the conversation.
pub fn build_messages(system: Option<&str>, messages: &[Message]) -> Vec<WireMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        wire.push(plain("system", system));
    }
    wire.extend(messages.iter().map(to_wire_message));
    wire
}

fn plain(role: &str, content: &str) -> WireMessage {
    WireMessage {
        role: role.to_string(),
        content: Some(content.to_string()),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

pub fn to_wire_message(message: &Message) -> WireMessage {
    match message {
        Message::Human { content, .. } => plain("user", content),
        Message::Ai { content, tool_calls, .. } if tool_calls.is_empty() => {
            plain("assistant", content)
        }
        Message::Ai { content, tool_calls, .. } => WireMessage {
            role: "assistant".to_string(),
            content: (!content.is_empty()).then(|| content.clone()),
            name: None,
            tool_calls: Some(
                tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        call_type: "function".to_string(),
                        function: FunctionCall {
                            name: call.name.clone(),
                            arguments: call.args.to_string(),
                        },
                    })
                    .collect(),
            ),
            tool_call_id: None,
        },
        Message::Tool { content, tool_name, tool_call_id, .. } => WireMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            name: Some(tool_name.clone()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}

pub fn convert_tools(tools: &[ToolDeclaration]) -> Vec<WireTool> {
    tools
        .iter()
        .map(|decl| WireTool {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: decl.name.clone(),
                description: decl.description.clone(),
                parameters: decl.parameters.clone(),
            },
        })
        .collect()
}

pub fn finish_reason(raw: &str) -> FinishReason {
    match raw {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "tool_calls" | "function_call" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

/// Decodes tool-call arguments; malformed JSON becomes an empty object.
pub fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| json!({}))
}

pub fn from_response(response: &ChatCompletionResponse) -> LlmResponse {
    let choice = response.choices.first();
    let message = choice.and_then(|c| c.message.as_ref());

    let text = message.and_then(|m| m.content.clone()).unwrap_or_default();
    let tool_calls: Vec<ToolCall> = message
        .and_then(|m| m.tool_calls.as_ref())
        .map(|calls| {
            calls
                .iter()
                .map(|c| {
                    ToolCall::new(c.id.clone(), c.function.name.clone(), parse_arguments(&c.function.arguments))
                })
                .collect()
        })
        .unwrap_or_default();

    LlmResponse {
        text,
        tool_calls,
        usage_metadata: response.usage.clone().map(Into::into),
        finish_reason: choice.and_then(|c| c.finish_reason.as_deref()).map(finish_reason),
        partial: false,
        turn_complete: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_with_tool_round_trip() {
        let call = ToolCall::new("call_1", "min_tool", json!({"data": [{"value": 3}]}));
        let messages = vec![
            Message::human("min please"),
            Message::ai_with_tool_calls("", vec![call]),
            Message::tool("min_tool", "call_1", r#"{"min_value":3}"#),
        ];
        let wire = build_messages(Some("You are terse."), &messages);

        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[2].content, None);
        let calls = wire[2].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "min_tool");
        assert_eq!(
            serde_json::from_str::<Value>(&calls[0].function.arguments).unwrap(),
            json!({"data": [{"value": 3}]})
        );
        assert_eq!(wire[3].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_from_response_with_tool_calls() {
        let raw = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_7",
                        "type": "function",
                        "function": {"name": "notify_thought_tool", "arguments": "{\"thought\":\"Gathering data\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let response: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let converted = from_response(&response);

        assert!(converted.text.is_empty());
        assert_eq!(converted.tool_calls[0].name, "notify_thought_tool");
        assert_eq!(converted.tool_calls[0].args["thought"], "Gathering data");
        assert_eq!(converted.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(converted.usage_metadata.unwrap().total_token_count, 15);
    }

    #[test]
    fn test_malformed_arguments() {
        assert_eq!(parse_arguments("{not json"), json!({}));
        assert_eq!(parse_arguments(""), json!({}));
    }
}
