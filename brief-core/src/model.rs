use crate::Result;
use crate::message::{Message, ToolCall};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub type LlmResponseStream = Pin<Box<dyn Stream<Item = Result<LlmResponse>> + Send>>;

#[async_trait]
pub trait Llm: Send + Sync {
    fn name(&self) -> &str;
    async fn generate_content(&self, req: LlmRequest, stream: bool) -> Result<LlmResponseStream>;
}

/// Calls `llm` without streaming and folds whatever it yields into one response.
pub async fn complete(llm: &dyn Llm, req: LlmRequest) -> Result<LlmResponse> {
    let stream = llm.generate_content(req, false).await?;
    collect_response(stream).await
}

/// Like [`complete`], but asks the provider to stream and folds the chunks as they arrive.
pub async fn complete_streaming(llm: &dyn Llm, req: LlmRequest) -> Result<LlmResponse> {
    let stream = llm.generate_content(req, true).await?;
    collect_response(stream).await
}

/// Folds a response stream: partial text is concatenated, tool calls accumulate and the
/// last reported finish reason and usage win.
pub async fn collect_response(mut stream: LlmResponseStream) -> Result<LlmResponse> {
    let mut merged = LlmResponse::default();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        merged.text.push_str(&chunk.text);
        merged.tool_calls.extend(chunk.tool_calls);
        if chunk.finish_reason.is_some() {
            merged.finish_reason = chunk.finish_reason;
        }
        if chunk.usage_metadata.is_some() {
            merged.usage_metadata = chunk.usage_metadata;
        }
    }
    merged.partial = false;
    merged.turn_complete = true;
    Ok(merged)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclaration>,
    pub config: Option<GenerateContentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Ask the provider for a single JSON object.
    #[serde(default)]
    pub json_mode: bool,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, ..Default::default() }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_config(mut self, config: GenerateContentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_json_mode(mut self) -> Self {
        self.config.get_or_insert_with(GenerateContentConfig::default).json_mode = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub usage_metadata: Option<UsageMetadata>,
    pub finish_reason: Option<FinishReason>,
    pub partial: bool,
    pub turn_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    ToolCalls,
    Safety,
    Other,
}

impl LlmResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            turn_complete: true,
            ..Default::default()
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self.finish_reason = Some(FinishReason::ToolCalls);
        self
    }

    /// A streamed fragment of text.
    pub fn partial(text: impl Into<String>) -> Self {
        Self { text: text.into(), partial: true, ..Default::default() }
    }

    pub fn into_message(self) -> Message {
        Message::ai_with_tool_calls(self.text, self.tool_calls)
    }
}
