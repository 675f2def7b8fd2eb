//! Turns workflow notifications into the client-facing event set.

use crate::report::parse_report;
use crate::sse::{EventKind, SseEvent};
use brief_core::Message;
use brief_graph::{StreamEvent, WorkflowStream};
use brief_tool::{THOUGHT_TOOL_NAME, ThoughtNote, ThoughtStage};
use futures::stream::{Stream, StreamExt};
use std::collections::HashSet;
use std::fmt::Display;

/// Per-stream translation state.
///
/// One translator serves one client stream: thought texts are deduplicated, the report
/// is emitted at most once and at most one `initial` event is sent.
#[derive(Debug)]
pub struct EventTranslator {
    thought_tool: String,
    sent_thoughts: HashSet<String>,
    report_started: bool,
    initial_sent: bool,
}

impl Default for EventTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::with_thought_tool(THOUGHT_TOOL_NAME)
    }

    pub fn with_thought_tool(name: impl Into<String>) -> Self {
        Self {
            thought_tool: name.into(),
            sent_thoughts: HashSet::new(),
            report_started: false,
            initial_sent: false,
        }
    }

    pub fn report_started(&self) -> bool {
        self.report_started
    }

    pub fn acknowledge(&mut self, input: &str) -> SseEvent {
        self.initial_sent = true;
        SseEvent::initial(format!("Received your request: \"{input}\". Working on it…"))
    }

    pub fn translate(&mut self, message: &Message) -> Vec<SseEvent> {
        match message {
            Message::Human { .. } => Vec::new(),
            Message::Ai { content, tool_calls, .. } if !tool_calls.is_empty() => {
                let notes: Vec<ThoughtNote> = tool_calls
                    .iter()
                    .filter(|call| call.name == self.thought_tool)
                    .filter_map(|call| ThoughtNote::from_call_args(&call.args))
                    .collect();
                if notes.is_empty() {
                    tracing::trace!(content_len = content.len(), "ignoring tool-call turn");
                }
                notes.into_iter().filter_map(|note| self.thought(note)).collect()
            }
            Message::Ai { content, .. } => self.answer(content),
            Message::Tool { content, tool_name, .. } => {
                if *tool_name != self.thought_tool {
                    return Vec::new();
                }
                ThoughtNote::from_tool_result(content)
                    .and_then(|note| self.thought(note))
                    .into_iter()
                    .collect()
            }
        }
    }

    pub fn finish(&self) -> SseEvent {
        SseEvent::done()
    }

    pub fn fail(&self, error: impl Display) -> SseEvent {
        SseEvent::error(format!("An error occurred: {error}"))
    }

    fn thought(&mut self, note: ThoughtNote) -> Option<SseEvent> {
        if !self.sent_thoughts.insert(note.text.clone()) {
            return None;
        }
        let kind = match note.stage {
            ThoughtStage::Initial if !self.initial_sent => {
                self.initial_sent = true;
                EventKind::Initial
            }
            _ => EventKind::Thought,
        };
        Some(SseEvent::new(kind, note.text))
    }

    fn answer(&mut self, content: &str) -> Vec<SseEvent> {
        if self.report_started {
            return Vec::new();
        }
        if let Some(report) = parse_report(content) {
            tracing::debug!(blocks = report.blocks.len(), "streaming report");
            self.report_started = true;
            return report.block_payloads().map(SseEvent::report_block).collect();
        }
        if content.trim().is_empty() {
            return Vec::new();
        }
        vec![SseEvent::chat(content)]
    }
}

/// Translates a workflow turn into client events.
///
/// The stream starts with the acknowledgement when `input` is given and always ends with
/// exactly one terminal event: `final` on success, `error` on the first failure.
pub fn translate_stream(
    mut translator: EventTranslator,
    input: Option<String>,
    mut turn: WorkflowStream,
) -> impl Stream<Item = SseEvent> + Send {
    async_stream::stream! {
        if let Some(input) = input {
            yield translator.acknowledge(&input);
        }

        while let Some(item) = turn.next().await {
            match item {
                Ok(StreamEvent::Message { message, .. }) => {
                    for event in translator.translate(&message) {
                        yield event;
                    }
                }
                Ok(StreamEvent::Done { total_steps, .. }) => {
                    tracing::debug!(total_steps, "turn complete");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "turn failed");
                    yield translator.fail(&e);
                    return;
                }
            }
        }

        yield translator.finish();
    }
}
