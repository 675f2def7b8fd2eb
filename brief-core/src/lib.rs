//! # brief-core
//!
//! Shared types for the brief report agent:
//!
//! - [`Message`] - user, assistant and tool turns, ordered by sequence number
//! - [`ReportContext`] / [`ContextField`] - the three facts a report request needs
//! - [`ConversationState`] - one user's persisted conversation
//! - [`Llm`] and [`Tool`] - the seams to model providers and callable tools
//! - [`BriefError`] / [`Result`] - shared error handling

pub mod context;
pub mod error;
pub mod message;
pub mod model;
pub mod state;
pub mod tool;

pub use context::{ContextField, ReportContext};
pub use error::{BriefError, Result};
pub use message::{Message, Role, ToolCall, next_sequence, observe_sequence};
pub use model::{
    FinishReason, GenerateContentConfig, Llm, LlmRequest, LlmResponse, LlmResponseStream,
    ToolDeclaration, UsageMetadata, collect_response, complete, complete_streaming,
};
pub use state::{ConversationState, session_key};
pub use tool::Tool;
