use anyhow::Result;
use brief_core::{ConversationState, Message};
use brief_graph::ContextWorkflow;
use brief_server::{BlockKind, EventKind, EventTranslator, ReportBlock, SseEvent, translate_stream};
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Console rendering of one client event. `final` renders as nothing.
pub fn render_event(event: &SseEvent) -> Option<String> {
    match event.event {
        EventKind::Initial | EventKind::Thought => Some(format!("  … {}", event.data)),
        EventKind::Chat => Some(format!("Agent -> {}", event.data)),
        EventKind::ReportBlock => Some(render_block(&event.data)),
        EventKind::Error => Some(format!("Error: {}", event.data)),
        EventKind::Final => None,
    }
}

fn render_block(json: &str) -> String {
    let Some(block) = ReportBlock::from_json(json) else {
        return json.to_string();
    };
    let data = block.data();
    let text = data.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
    match block.kind() {
        BlockKind::Header => {
            let level = data.get("level").and_then(Value::as_u64).unwrap_or(2).clamp(1, 6);
            format!("{} {text}", "#".repeat(level as usize))
        }
        BlockKind::Paragraph => text,
        BlockKind::List => {
            let ordered = data.get("style").and_then(Value::as_str) == Some("ordered");
            let items = data.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let item = item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string());
                    if ordered { format!("{}. {item}", i + 1) } else { format!("- {item}") }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        BlockKind::Other if !text.is_empty() => text,
        BlockKind::Other => format!("[{}] {data}", block.type_name()),
    }
}

/// Runs one turn and writes its rendered events to `out`.
pub async fn chat_turn<W: Write>(
    workflow: Arc<ContextWorkflow>,
    user_id: &str,
    input: &str,
    out: &mut W,
) -> Result<()> {
    let turn = workflow.run_turn(user_id, input);
    let mut events = Box::pin(translate_stream(EventTranslator::new(), None, turn));
    while let Some(event) = events.next().await {
        if let Some(line) = render_event(&event) {
            writeln!(out, "{line}")?;
        }
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn write_transcript<W: Write>(state: &ConversationState, out: &mut W) -> Result<()> {
    writeln!(out, "Conversation History:")?;
    for message in &state.messages {
        match message {
            Message::Human { content, .. } => writeln!(out, "User: {content}")?,
            Message::Ai { content, .. } if !content.trim().is_empty() => {
                writeln!(out, "AI: {content}")?
            }
            Message::Ai { .. } | Message::Tool { .. } => {}
        }
    }
    writeln!(out, "\nEnd of conversation history.")?;
    Ok(())
}

pub async fn run_console(
    workflow: Arc<ContextWorkflow>,
    user_id: String,
    transcript: Option<&Path>,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut stdout = std::io::stdout();

    println!("brief console");
    println!("Ask for a report. Ctrl+C or Ctrl+D to exit.\n");

    loop {
        match rl.readline("User -> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;
                chat_turn(workflow.clone(), &user_id, input, &mut stdout).await?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = transcript {
        if let Some(state) = workflow.state(&user_id).await? {
            let mut file = std::fs::File::create(path)?;
            write_transcript(&state, &mut file)?;
            println!("Transcript written to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_blocks() {
        let header = SseEvent::report_block(r#"{"type":"header","data":{"text":"Q1","level":3}}"#);
        assert_eq!(render_event(&header).unwrap(), "### Q1");

        let list = SseEvent::report_block(
            r#"{"type":"list","data":{"style":"ordered","items":["a","b"]}}"#,
        );
        assert_eq!(render_event(&list).unwrap(), "1. a\n2. b");
        assert!(render_event(&SseEvent::done()).is_none());

        let quote = SseEvent::report_block(r#"{"id":"q","type":"quote","data":{"text":"Growth"}}"#);
        assert_eq!(render_event(&quote).unwrap(), "Growth");
    }

    #[test]
    fn test_transcript_skips_tool_traffic() {
        let state = ConversationState::new("1").with_messages(vec![
            Message::human("hello"),
            Message::ai_with_tool_calls("", vec![]),
            Message::tool("sum_tool", "c1", "{}"),
            Message::ai("hi"),
        ]);
        let mut out = Vec::new();
        write_transcript(&state, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Conversation History:\nUser: hello\nAI: hi\n\nEnd of conversation history.\n"
        );
    }
}
