use brief_core::{
    BriefError, Llm, LlmRequest, LlmResponse, Message, Result, Tool, ToolCall, complete,
    complete_streaming,
};
use brief_graph::{DEFAULT_HISTORY_WINDOW, trim_history};
use brief_telemetry::Instrument;
use futures::stream::{Stream, StreamExt};
use serde_json::{Value, json};
use std::pin::Pin;
use std::sync::Arc;

pub type AgentStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// An agent that calls its model in a loop, running requested tools between calls,
/// until the model answers without tool calls.
#[derive(Clone)]
pub struct ReactAgent {
    name: String,
    description: String,
    instruction: String,
    llm: Arc<dyn Llm>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
    history_window: usize,
    streaming: bool,
}

pub struct ReactAgentBuilder {
    name: String,
    description: String,
    instruction: String,
    llm: Option<Arc<dyn Llm>>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
    history_window: usize,
    streaming: bool,
}

impl ReactAgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            llm: None,
            tools: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            history_window: DEFAULT_HISTORY_WINDOW,
            streaming: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn model(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Model calls allowed per run before the run fails.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Trailing messages the model sees on each call.
    pub fn history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window.max(1);
        self
    }

    /// Ask the model to stream each reply. Replies are still handled whole.
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn build(self) -> Result<ReactAgent> {
        let llm = self
            .llm
            .ok_or_else(|| BriefError::Agent(format!("agent '{}' has no model", self.name)))?;
        Ok(ReactAgent {
            name: self.name,
            description: self.description,
            instruction: self.instruction,
            llm,
            tools: self.tools,
            max_iterations: self.max_iterations,
            history_window: self.history_window,
            streaming: self.streaming,
        })
    }
}

impl ReactAgent {
    pub fn builder(name: impl Into<String>) -> ReactAgentBuilder {
        ReactAgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    async fn call_model(&self, request: LlmRequest) -> Result<LlmResponse> {
        if self.streaming {
            complete_streaming(self.llm.as_ref(), request).await
        } else {
            complete(self.llm.as_ref(), request).await
        }
    }

    async fn execute_tool(&self, call: &ToolCall) -> Value {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(agent = %self.name, tool = %call.name, "model requested unknown tool");
            return json!({"error": format!("Tool {} not found", call.name)});
        };
        let span = brief_telemetry::tool_execute_span(&call.name);
        match tool.execute(call.args.clone()).instrument(span).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(agent = %self.name, tool = %call.name, error = %e, "tool failed");
                json!({"error": e.to_string()})
            }
        }
    }

    /// Runs the agent on `messages` and streams every message it adds: assistant turns
    /// and tool results, in order.
    ///
    /// Tool failures are reported back to the model as `{"error": ...}` results. Running
    /// out of iterations ends the stream with an error.
    pub fn run(&self, messages: Vec<Message>) -> AgentStream {
        let agent = self.clone();
        let declarations: Vec<_> = self.tools.iter().map(|t| t.declaration()).collect();
        let span = brief_telemetry::agent_run_span(&self.name, "");

        let stream = async_stream::stream! {
            let mut conversation = messages;

            for iteration in 1..=agent.max_iterations {
                let mut request = LlmRequest::new(trim_history(&conversation, agent.history_window))
                    .with_tools(declarations.clone());
                if !agent.instruction.is_empty() {
                    request = request.with_system(agent.instruction.clone());
                }

                let response = match agent.call_model(request).instrument(span.clone()).await {
                    Ok(response) => response,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                tracing::debug!(
                    agent = %agent.name,
                    iteration,
                    tool_calls = response.tool_calls.len(),
                    "model responded"
                );

                let message = response.into_message();
                let calls = message.tool_calls().to_vec();
                conversation.push(message.clone());
                yield Ok(message);

                if calls.is_empty() {
                    return;
                }

                for call in &calls {
                    let result = agent.execute_tool(call).await;
                    let tool_message = Message::tool(&call.name, &call.id, result.to_string());
                    conversation.push(tool_message.clone());
                    yield Ok(tool_message);
                }
            }

            yield Err(BriefError::Agent(format!(
                "{}: max iterations ({}) exceeded",
                agent.name, agent.max_iterations
            )));
        };

        Box::pin(stream)
    }

    /// Runs the agent to completion and returns the messages it added.
    pub async fn run_to_completion(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let mut stream = self.run(messages);
        let mut produced = Vec::new();
        while let Some(message) = stream.next().await {
            produced.push(message?);
        }
        Ok(produced)
    }
}
