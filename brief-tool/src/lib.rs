//! # brief-tool
//!
//! [`FunctionTool`] wraps an async closure as a [`brief_core::Tool`]. The [`builtin`]
//! module holds the tools the report team uses: thought notifications, a sample data
//! source built on [`FunctionTool`] and numeric aggregates.

pub mod builtin;
mod function_tool;

pub use builtin::{
    Aggregate, AggregateTool, GATHER_DATA_TOOL_NAME, NotifyThoughtTool, THOUGHT_TOOL_NAME,
    ThoughtNote, ThoughtStage, aggregate_tools, gather_data_tool,
};
pub use function_tool::FunctionTool;
