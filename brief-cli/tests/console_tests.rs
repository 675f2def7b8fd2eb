use async_trait::async_trait;
use brief_cli::console::{chat_turn, write_transcript};
use brief_core::{Llm, Message};
use brief_graph::prelude::*;
use brief_model::MockLlm;
use std::sync::Arc;

struct FixedReport;

#[async_trait]
impl Pipeline for FixedReport {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn run(&self, _messages: Vec<Message>) -> brief_core::Result<PipelineStream> {
        let report = r#"{"blocks": [
            {"type": "header", "data": {"text": "Acme Q1", "level": 2}},
            {"type": "paragraph", "data": {"text": "Sales rose."}}
        ]}"#;
        Ok(Box::pin(futures::stream::iter(vec![Ok(Message::ai(report))])))
    }
}

fn workflow(extractions: &[&str]) -> Arc<ContextWorkflow> {
    let llm = extractions.iter().fold(MockLlm::new("extractor"), |llm, text| llm.with_text(*text));
    Arc::new(ContextWorkflow::new(
        ContextExtractor::new(Arc::new(llm) as Arc<dyn Llm>),
        Dispatcher::new(Arc::new(FixedReport)),
        Arc::new(MemoryCheckpointer::new()),
    ))
}

#[tokio::test]
async fn console_conversation_and_transcript() {
    let workflow = workflow(&[
        r#"{"subject": "Acme", "time_range": "Q1"}"#,
        r#"{"report_kind": "summary"}"#,
    ]);

    let mut out = Vec::new();
    chat_turn(workflow.clone(), "console_user", "Give me a Q1 report for Acme", &mut out)
        .await
        .unwrap();
    chat_turn(workflow.clone(), "console_user", "a summary", &mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Agent -> What kind of report"));
    assert!(printed.contains("## Acme Q1\nSales rose.\n"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transcript.txt");
    let state = workflow.state("console_user").await.unwrap().unwrap();
    let mut file = std::fs::File::create(&path).unwrap();
    write_transcript(&state, &mut file).unwrap();
    drop(file);

    let transcript = std::fs::read_to_string(&path).unwrap();
    assert!(transcript.starts_with("Conversation History:\nUser: Give me a Q1 report for Acme\n"));
    assert!(transcript.contains("User: Subject: Acme, Time range: Q1, Report kind: summary\n"));
    assert!(transcript.ends_with("End of conversation history.\n"));
}
