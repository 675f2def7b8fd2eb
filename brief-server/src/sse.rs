//! The externally visible event set and its wire encoding.

use axum::response::sse::Event;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text of the terminal `final` event.
pub const FINAL_TEXT: &str = "Done";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Initial,
    Thought,
    Chat,
    ReportBlock,
    Error,
    Final,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Initial => "initial",
            EventKind::Thought => "thought",
            EventKind::Chat => "chat",
            EventKind::ReportBlock => "report_block",
            EventKind::Error => "error",
            EventKind::Final => "final",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::Error | EventKind::Final)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseEvent {
    pub event: EventKind,
    pub data: String,
}

impl SseEvent {
    pub fn new(event: EventKind, data: impl Into<String>) -> Self {
        Self { event, data: normalize_newlines(&data.into()) }
    }

    pub fn initial(text: impl Into<String>) -> Self {
        Self::new(EventKind::Initial, text)
    }

    pub fn thought(text: impl Into<String>) -> Self {
        Self::new(EventKind::Thought, text)
    }

    pub fn chat(text: impl Into<String>) -> Self {
        Self::new(EventKind::Chat, text)
    }

    pub fn report_block(block_json: impl Into<String>) -> Self {
        Self::new(EventKind::ReportBlock, block_json)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EventKind::Error, text)
    }

    pub fn done() -> Self {
        Self::new(EventKind::Final, FINAL_TEXT)
    }

    /// `event: <name>` followed by one `data:` line per line of the payload and a blank
    /// line.
    pub fn encode(&self) -> String {
        let mut out = format!("event: {}\n", self.event);
        for line in self.data.split('\n') {
            out.push_str("data: ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out
    }

    pub fn to_axum(&self) -> Event {
        Event::default().event(self.event.as_str()).data(&self.data)
    }
}

fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') { text.replace("\r\n", "\n").replace('\r', "\n") } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_multiline() {
        let event = SseEvent::chat("line one\r\nline two\rline three");
        assert_eq!(
            event.encode(),
            "event: chat\ndata: line one\ndata: line two\ndata: line three\n\n"
        );
    }

    #[test]
    fn test_single_line() {
        assert_eq!(SseEvent::done().encode(), "event: final\ndata: Done\n\n");
        assert_eq!(SseEvent::report_block("{}").event.as_str(), "report_block");
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(EventKind::Error.is_terminal());
        assert!(EventKind::Final.is_terminal());
        assert!(!EventKind::Thought.is_terminal());
    }
}
