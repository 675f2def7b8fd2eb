//! Span helpers for agent, model, tool and workflow operations

use tracing::Span;

/// Span around one agent run.
///
/// ```
/// use brief_telemetry::agent_run_span;
/// let span = agent_run_span("supervisor", "user-42");
/// let _enter = span.enter();
/// ```
pub fn agent_run_span(agent_name: &str, session_id: &str) -> Span {
    tracing::info_span!("agent.run", agent.name = agent_name, session.id = session_id)
}

/// Span around a model API call.
pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name)
}

pub fn tool_execute_span(tool_name: &str) -> Span {
    tracing::info_span!("tool.execute", tool.name = tool_name)
}

/// Span around one workflow node for one session.
pub fn node_span(node: &str, thread_id: &str, step: usize) -> Span {
    tracing::info_span!("workflow.node", node = node, thread.id = thread_id, step = step)
}
