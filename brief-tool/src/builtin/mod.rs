//! Tools available to the report team.

mod aggregate;
mod data;
mod thought;

pub use aggregate::{Aggregate, AggregateTool};
pub use data::{GATHER_DATA_TOOL_NAME, gather_data_tool, generate_dataset};
pub use thought::{NotifyThoughtTool, THOUGHT_TOOL_NAME, ThoughtNote, ThoughtStage};

use brief_core::Tool;
use std::sync::Arc;

/// The four numeric aggregate tools.
pub fn aggregate_tools() -> Vec<Arc<dyn Tool>> {
    Aggregate::ALL.into_iter().map(|op| Arc::new(AggregateTool::new(op)) as Arc<dyn Tool>).collect()
}
