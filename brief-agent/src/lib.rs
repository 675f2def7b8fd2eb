//! # brief-agent
//!
//! Agents for the report pipeline.
//!
//! - [`ReactAgent`] - calls its model in a loop and runs the tools it asks for
//! - [`AgentTool`] - exposes an agent to another agent as `transfer_to_<name>`
//! - [`SupervisorPipeline`] - a supervising agent wrapped as a [`brief_graph::Pipeline`]
//!
//! [`report_team`] assembles the data, math and verification agents under a supervisor
//! that writes the final Editor.js report.

pub mod agent_tool;
pub mod prompts;
pub mod react_agent;
pub mod supervisor;

pub use agent_tool::{AgentTool, HANDOFF_PREFIX};
pub use react_agent::{AgentStream, DEFAULT_MAX_ITERATIONS, ReactAgent, ReactAgentBuilder};
pub use supervisor::{SUPERVISOR_NAME, SupervisorPipeline, report_team};
