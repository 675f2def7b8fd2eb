use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brief_core::{BriefError, Llm, Message, ToolCall};
use brief_graph::prelude::*;
use brief_model::MockLlm;
use brief_server::{ServerConfig, create_app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

/// Pipeline that replays fixed messages, failing where the script says so.
struct ScriptedPipeline {
    script: Vec<std::result::Result<Message, String>>,
}

#[async_trait]
impl Pipeline for ScriptedPipeline {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(&self, _messages: Vec<Message>) -> brief_core::Result<PipelineStream> {
        let items: Vec<brief_core::Result<Message>> = self
            .script
            .iter()
            .map(|step| step.clone().map_err(BriefError::Pipeline))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

const COMPLETE_CONTEXT: &str =
    r#"{"subject": "Acme", "time_range": "Q1", "report_kind": "financial"}"#;

fn config(extraction: &str, script: Vec<std::result::Result<Message, String>>) -> ServerConfig {
    let extractor = ContextExtractor::new(Arc::new(MockLlm::new("extractor").with_text(extraction)) as Arc<dyn Llm>);
    let workflow = ContextWorkflow::new(
        extractor,
        Dispatcher::new(Arc::new(ScriptedPipeline { script })),
        Arc::new(MemoryCheckpointer::new()),
    );
    ServerConfig::new(Arc::new(workflow))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Splits an SSE body into `(event, data)` pairs, joining multi-line data.
fn parse_events(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data = Vec::new();
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = Some(name.trim_start().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                }
            }
            event.map(|e| (e, data.join("\n")))
        })
        .collect()
}

async fn run_chat(config: ServerConfig, body: Value) -> Vec<(String, String)> {
    let response = create_app(config).oneshot(chat_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");
    parse_events(&body_text(response).await)
}

fn names(events: &[(String, String)]) -> Vec<&str> {
    events.iter().map(|(name, _)| name.as_str()).collect()
}

#[tokio::test]
async fn test_health() {
    let app = create_app(config(COMPLETE_CONTEXT, vec![]));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_index_page() {
    let app = create_app(config(COMPLETE_CONTEXT, vec![]));
    let response =
        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/chat"));
}

#[tokio::test]
async fn test_missing_input() {
    let app = create_app(config(COMPLETE_CONTEXT, vec![]));
    let response = app.oneshot(chat_request(json!({"user_id": "42"}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing 'input'");
}

#[tokio::test]
async fn test_missing_user_id() {
    let app = create_app(config(COMPLETE_CONTEXT, vec![]));
    let response = app.oneshot(chat_request(json!({"input": "hello"}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing 'user_id'");
}

#[tokio::test]
async fn test_unparseable_body_is_empty() {
    let app = create_app(config(COMPLETE_CONTEXT, vec![]));
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .body(Body::from("input=hello"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_optional_user_id_is_generated() {
    let config = config(COMPLETE_CONTEXT, vec![Ok(Message::ai("hi there"))])
        .with_require_user_id(false);
    let events = run_chat(config, json!({"input": "hello"})).await;
    assert_eq!(names(&events), vec!["initial", "chat", "final"]);
}

#[tokio::test]
async fn test_asks_for_report_kind() {
    let extraction = r#"{"subject": "Acme", "time_range": "Q1", "report_kind": null}"#;
    let events = run_chat(
        config(extraction, vec![Ok(Message::ai("should not run"))]),
        json!({"input": "Give me a Q1 report for Acme", "user_id": "42"}),
    )
    .await;

    assert_eq!(names(&events), vec!["initial", "chat", "final"]);
    assert!(events[0].1.contains("Give me a Q1 report for Acme"));
    assert_eq!(
        events[1].1,
        brief_graph::gate::default_question(brief_core::ContextField::ReportKind)
    );
}

#[tokio::test]
async fn test_report_blocks_streamed_in_order() {
    let blocks = json!([
        {"type": "header", "data": {"text": "Q1 Sales Analysis", "level": 2}},
        {"type": "paragraph", "data": {"text": "Revenue grew 15%."}}
    ]);
    let report = json!({"time": 1752971214073_i64, "blocks": blocks}).to_string();
    let events = run_chat(
        config(COMPLETE_CONTEXT, vec![Ok(Message::ai(report.clone())), Ok(Message::ai(report))]),
        json!({"input": "financial", "user_id": 7}),
    )
    .await;

    assert_eq!(names(&events), vec!["initial", "report_block", "report_block", "final"]);
    let first: Value = serde_json::from_str(&events[1].1).unwrap();
    let second: Value = serde_json::from_str(&events[2].1).unwrap();
    assert_eq!(first, blocks[0]);
    assert_eq!(second, blocks[1]);
}

#[tokio::test]
async fn test_thoughts_deduplicated() {
    let call = ToolCall::new(
        "t1",
        "notify_thought_tool",
        json!({"thought": "Gathering Q1 data", "stage": "initial"}),
    );
    let script = vec![
        Ok(Message::ai_with_tool_calls("", vec![call])),
        Ok(Message::tool(
            "notify_thought_tool",
            "t1",
            r#"{"event": "initial", "content": "Gathering Q1 data"}"#,
        )),
        Ok(Message::ai("Nothing to report yet.")),
    ];
    let events = run_chat(config(COMPLETE_CONTEXT, script), json!({"input": "go", "user_id": "1"})).await;

    assert_eq!(names(&events), vec!["initial", "thought", "chat", "final"]);
    assert_eq!(events[1].1, "Gathering Q1 data");
}

#[tokio::test]
async fn test_pipeline_failure_single_error() {
    let script = vec![Ok(Message::ai("starting")), Err("data_agent crashed".to_string())];
    let events = run_chat(config(COMPLETE_CONTEXT, script), json!({"input": "go", "user_id": "5"})).await;

    assert_eq!(names(&events), vec!["initial", "chat", "error"]);
    assert!(events[2].1.starts_with("An error occurred: "));
    assert!(events[2].1.contains("data_agent crashed"));
}

#[tokio::test]
async fn test_report_blocks_sent_verbatim() {
    let blocks = json!([
        {"id": "h1", "type": "header", "data": {"text": "Q1", "level": 2}},
        {"type": "paragraph", "data": {"text": "Up 15%."}, "tunes": {"alignment": {"alignment": "left"}}},
        {"id": "q1", "type": "quote", "data": {"text": "Best quarter yet", "caption": "CFO"}}
    ]);
    let report = json!({"time": 1752971214073_i64, "blocks": blocks}).to_string();
    let events = run_chat(
        config(COMPLETE_CONTEXT, vec![Ok(Message::ai(report))]),
        json!({"input": "financial", "user_id": "8"}),
    )
    .await;

    assert_eq!(
        names(&events),
        vec!["initial", "report_block", "report_block", "report_block", "final"]
    );
    for (i, (_, data)) in events[1..4].iter().enumerate() {
        let payload: Value = serde_json::from_str(data).unwrap();
        assert_eq!(payload, blocks[i]);
    }
    assert_eq!(events[1].1, blocks[0].to_string());
}

#[tokio::test]
async fn test_pipeline_start_failure_single_error() {
    struct Unavailable;

    #[async_trait]
    impl Pipeline for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        async fn run(&self, _messages: Vec<Message>) -> brief_core::Result<PipelineStream> {
            Err(BriefError::Pipeline("report team unavailable".into()))
        }
    }

    let extractor =
        ContextExtractor::new(Arc::new(MockLlm::new("extractor").with_text(COMPLETE_CONTEXT)) as Arc<dyn Llm>);
    let workflow = ContextWorkflow::new(
        extractor,
        Dispatcher::new(Arc::new(Unavailable)),
        Arc::new(MemoryCheckpointer::new()),
    );
    let events =
        run_chat(ServerConfig::new(Arc::new(workflow)), json!({"input": "go", "user_id": "6"})).await;

    assert_eq!(names(&events), vec!["initial", "error"]);
    assert!(events[1].1.contains("report team unavailable"));
}
