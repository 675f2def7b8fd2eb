//! Hand-off tools that let a supervisor delegate to a sub-agent.

use crate::react_agent::ReactAgent;
use async_trait::async_trait;
use brief_core::{BriefError, Message, Result, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

pub const HANDOFF_PREFIX: &str = "transfer_to_";

/// Wraps a [`ReactAgent`] as a tool named `transfer_to_<agent>`.
///
/// The sub-agent starts from a single user message holding the request and its last
/// plain answer becomes the tool result.
pub struct AgentTool {
    agent: Arc<ReactAgent>,
    name: String,
    description: String,
    timeout: Option<Duration>,
}

impl AgentTool {
    pub fn new(agent: Arc<ReactAgent>) -> Self {
        let name = format!("{HANDOFF_PREFIX}{}", agent.name());
        let description = if agent.description().is_empty() {
            format!("Hand the task to {}", agent.name())
        } else {
            format!("Hand the task to {}: {}", agent.name(), agent.description())
        };
        Self { agent, name, description, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    fn extract_request(args: &Value) -> String {
        match args.get("request").and_then(Value::as_str) {
            Some(request) => request.to_string(),
            None => args.to_string(),
        }
    }

    async fn delegate(&self, request: String) -> Result<Vec<Message>> {
        let run = self.agent.run_to_completion(vec![Message::human(request)]);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                BriefError::Tool(format!("{} timed out after {:?}", self.agent.name(), limit))
            })?,
            None => run.await,
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": format!("What {} should do", self.agent.name())
                }
            },
            "required": ["request"]
        }))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let request = Self::extract_request(&args);
        tracing::info!(agent = self.agent.name(), "handing off");

        let produced = self
            .delegate(request)
            .await
            .map_err(|e| BriefError::Tool(format!("{} failed: {e}", self.agent.name())))?;
        let response = produced
            .iter()
            .rev()
            .find(|m| m.is_final_answer())
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        Ok(json!({"agent": self.agent.name(), "response": response}))
    }
}
