//! # brief-graph
//!
//! The conversation workflow behind brief. A turn runs two nodes:
//!
//! - `get_context` - [`ContextExtractor`] recovers subject, time range and report kind,
//!   then the [`CompletionGate`] either asks for the first missing field or lets the turn
//!   continue
//! - `supervisor` - the [`Dispatcher`] forwards the conversation and a context summary
//!   to a [`Pipeline`] and streams back what it produces
//!
//! Message logs are merged with [`merge_messages`], an idempotent set-union keyed by
//! sequence number, and every completed node is committed through a [`Checkpointer`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brief_graph::prelude::*;
//! use std::sync::Arc;
//!
//! let workflow = Arc::new(ContextWorkflow::new(
//!     ContextExtractor::new(extraction_llm),
//!     Dispatcher::new(pipeline),
//!     Arc::new(MemoryCheckpointer::new()),
//! ));
//! let mut events = workflow.run_turn("42", "Give me a Q1 report for Acme");
//! ```
//!
//! ## Feature Flags
//!
//! - `sqlite` - [`SqliteCheckpointer`](checkpoint::SqliteCheckpointer)

pub mod checkpoint;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod gate;
pub mod reducer;
pub mod stream;
pub mod workflow;

pub use checkpoint::{Checkpoint, Checkpointer, MemoryCheckpointer};
#[cfg(feature = "sqlite")]
pub use checkpoint::SqliteCheckpointer;
pub use dispatch::{Dispatch, Dispatcher, Pipeline, PipelineStream};
pub use error::{GraphError, Result};
pub use extract::{ContextExtractor, parse_extraction, strip_code_fence};
pub use gate::{CompletionGate, GateDecision, GateState};
pub use reducer::{DEFAULT_HISTORY_WINDOW, append_messages, merge_messages, trim_history};
pub use stream::StreamEvent;
pub use workflow::{ContextWorkflow, GET_CONTEXT, SUPERVISOR, WorkflowStream};

pub mod prelude {
    pub use crate::checkpoint::{Checkpoint, Checkpointer, MemoryCheckpointer};
    pub use crate::dispatch::{Dispatcher, Pipeline, PipelineStream};
    pub use crate::error::{GraphError, Result};
    pub use crate::extract::ContextExtractor;
    pub use crate::gate::{CompletionGate, GateDecision, GateState};
    pub use crate::reducer::{merge_messages, trim_history};
    pub use crate::stream::StreamEvent;
    pub use crate::workflow::{ContextWorkflow, GET_CONTEXT, SUPERVISOR};
}
