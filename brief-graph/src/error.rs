//! Error types for brief-graph

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node '{node}' execution failed: {message}")]
    NodeExecutionFailed { node: String, message: String },

    #[error("State serialization error: {0}")]
    SerializationError(String),

    #[error("Checkpoint error: {0}")]
    CheckpointError(String),

    #[error("{0}")]
    Core(#[from] brief_core::BriefError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Database error (when sqlite feature enabled)
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl GraphError {
    pub fn node_failed(node: &str, message: impl std::fmt::Display) -> Self {
        GraphError::NodeExecutionFailed { node: node.to_string(), message: message.to_string() }
    }
}
