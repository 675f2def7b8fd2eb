use brief_graph::ContextWorkflow;
use brief_tool::THOUGHT_TOOL_NAME;
use std::{sync::Arc, time::Duration};

/// Security configuration for the chat server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
    /// Time allowed until response headers are sent (default: 30 seconds)
    pub request_timeout: Duration,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SecurityConfig {
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// Configuration for the chat server.
#[derive(Clone)]
pub struct ServerConfig {
    pub workflow: Arc<ContextWorkflow>,
    pub security: SecurityConfig,
    /// Reject requests without a `user_id` instead of assigning a random one.
    pub require_user_id: bool,
    /// Send an `initial` acknowledgement before the turn starts.
    pub acknowledge: bool,
    pub thought_tool: String,
}

impl ServerConfig {
    pub fn new(workflow: Arc<ContextWorkflow>) -> Self {
        Self {
            workflow,
            security: SecurityConfig::default(),
            require_user_id: true,
            acknowledge: true,
            thought_tool: THOUGHT_TOOL_NAME.to_string(),
        }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }

    pub fn with_require_user_id(mut self, require: bool) -> Self {
        self.require_user_id = require;
        self
    }

    pub fn with_acknowledge(mut self, acknowledge: bool) -> Self {
        self.acknowledge = acknowledge;
        self
    }

    pub fn with_thought_tool(mut self, name: impl Into<String>) -> Self {
        self.thought_tool = name.into();
        self
    }
}
