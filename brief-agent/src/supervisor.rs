use crate::agent_tool::AgentTool;
use crate::prompts::{
    DATA_AGENT_PROMPT, MATH_AGENT_PROMPT, SUPERVISOR_PROMPT, VERIFICATION_AGENT_PROMPT,
};
use crate::react_agent::ReactAgent;
use async_trait::async_trait;
use brief_core::{Llm, Message, Result, Tool};
use brief_graph::{Pipeline, PipelineStream};
use brief_tool::{NotifyThoughtTool, aggregate_tools, gather_data_tool};
use std::sync::Arc;

pub const SUPERVISOR_NAME: &str = "supervisor";
pub const SUPERVISOR_MAX_ITERATIONS: usize = 50;

/// Runs a supervising [`ReactAgent`] as the report pipeline.
///
/// Everything the supervisor adds to the conversation is streamed: its own turns,
/// thought notifications and hand-off results.
pub struct SupervisorPipeline {
    supervisor: ReactAgent,
}

impl SupervisorPipeline {
    pub fn new(supervisor: ReactAgent) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &ReactAgent {
        &self.supervisor
    }
}

#[async_trait]
impl Pipeline for SupervisorPipeline {
    fn name(&self) -> &str {
        self.supervisor.name()
    }

    async fn run(&self, messages: Vec<Message>) -> Result<PipelineStream> {
        Ok(self.supervisor.run(messages))
    }
}

/// Builds the report team on one model: a data agent, a math agent and a verification
/// agent behind a supervisor that writes the report. With `streaming` every agent asks
/// the model for streamed replies.
pub fn report_team(llm: Arc<dyn Llm>, streaming: bool) -> Result<SupervisorPipeline> {
    let data_agent = ReactAgent::builder("data_agent")
        .description("Collects the raw figures a report needs")
        .instruction(DATA_AGENT_PROMPT)
        .model(llm.clone())
        .tool(Arc::new(gather_data_tool()))
        .streaming(streaming)
        .build()?;

    let math_agent = ReactAgent::builder("math_agent")
        .description("Computes minimum, maximum, average and sum over item values")
        .instruction(MATH_AGENT_PROMPT)
        .model(llm.clone())
        .tools(aggregate_tools())
        .streaming(streaming)
        .build()?;

    let verification_agent = ReactAgent::builder("verification_agent")
        .description("Checks findings against the data before they are published")
        .instruction(VERIFICATION_AGENT_PROMPT)
        .model(llm.clone())
        .streaming(streaming)
        .build()?;

    let handoffs: Vec<Arc<dyn Tool>> = [data_agent, math_agent, verification_agent]
        .into_iter()
        .map(|agent| Arc::new(AgentTool::new(Arc::new(agent))) as Arc<dyn Tool>)
        .collect();

    let supervisor = ReactAgent::builder(SUPERVISOR_NAME)
        .description("Plans the report, delegates to the team and writes the document")
        .instruction(SUPERVISOR_PROMPT)
        .model(llm)
        .tools(handoffs)
        .tool(Arc::new(NotifyThoughtTool))
        .max_iterations(SUPERVISOR_MAX_ITERATIONS)
        .streaming(streaming)
        .build()?;

    Ok(SupervisorPipeline::new(supervisor))
}
