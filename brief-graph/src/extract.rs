//! Recovers the report context from free-form conversation.

use brief_core::{Llm, LlmRequest, Message, ReportContext, complete};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

pub const EXTRACTION_PROMPT: &str = "\
You read a conversation between a user and a reporting assistant and pull out what the \
user wants a report about. Reply with a single JSON object and nothing else:

{\"subject\": string or null, \"time_range\": string or null, \"report_kind\": string or null}

- subject: the company, product or topic the report covers
- time_range: the period to cover, as the user phrased it (for example \"Q1\", \"2023\", \"last month\")
- report_kind: the type of report (for example \"financial\", \"summary\", \"sales\")

Use null for anything the user has not said. Do not guess.";

/// Fills missing report-context fields by asking a model to read the conversation.
///
/// Extraction never fails: any model error, timeout or unreadable reply counts as
/// "nothing recovered" and the known fields come back unchanged.
pub struct ContextExtractor {
    llm: Arc<dyn Llm>,
    prompt: String,
    timeout: Duration,
}

impl ContextExtractor {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm, prompt: EXTRACTION_PROMPT.to_string(), timeout: DEFAULT_EXTRACTION_TIMEOUT }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns `known` with any unset fields filled from the conversation.
    pub async fn extract(&self, messages: &[Message], known: &ReportContext) -> ReportContext {
        if known.is_complete() {
            return known.clone();
        }

        let mut context = known.clone();
        if let Some(recovered) = self.call_model(messages).await {
            context.fill_missing_from(&recovered);
        }
        tracing::debug!(
            subject = ?context.subject,
            time_range = ?context.time_range,
            report_kind = ?context.report_kind,
            "context extracted"
        );
        context
    }

    async fn call_model(&self, messages: &[Message]) -> Option<ReportContext> {
        let transcript: Vec<Message> = messages
            .iter()
            .filter(|m| m.is_human() || (m.is_final_answer() && !m.content().trim().is_empty()))
            .cloned()
            .collect();
        if transcript.is_empty() {
            return None;
        }

        let request = LlmRequest::new(transcript).with_system(self.prompt.clone()).with_json_mode();
        let response = match tokio::time::timeout(self.timeout, complete(self.llm.as_ref(), request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "context extraction failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "context extraction timed out");
                return None;
            }
        };

        let parsed = parse_extraction(&response.text);
        if parsed.is_none() {
            tracing::warn!(reply = %response.text, "unreadable context extraction reply");
        }
        parsed
    }
}

/// Reads a context object out of a model reply.
///
/// Accepts a bare JSON object, one wrapped in a Markdown code fence, or one embedded in
/// surrounding prose (the first `{` to the last `}`).
pub fn parse_extraction(reply: &str) -> Option<ReportContext> {
    let text = strip_code_fence(reply.trim());
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return ReportContext::from_json_value(&value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&text[start..=end]).ok()?;
    ReportContext::from_json_value(&value)
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brief_core::LlmResponseStream;

    /// Model that never answers.
    struct Silent;

    #[async_trait]
    impl Llm for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        async fn generate_content(
            &self,
            _req: LlmRequest,
            _stream: bool,
        ) -> brief_core::Result<LlmResponseStream> {
            futures::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_known_context() {
        let extractor = ContextExtractor::new(Arc::new(Silent)).with_timeout(Duration::from_secs(5));
        let known = ReportContext::new(Some("Acme"), None, None);
        let started = tokio::time::Instant::now();

        let context = extractor.extract(&[Message::human("Q1 please")], &known).await;

        assert_eq!(context, known);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_parse_plain_json() {
        let ctx = parse_extraction(r#"{"subject": "Acme", "time_range": "Q1", "report_kind": null}"#)
            .unwrap();
        assert_eq!(ctx, ReportContext::new(Some("Acme"), Some("Q1"), None));
    }

    #[test]
    fn test_parse_fenced_and_embedded() {
        let fenced = "```json\n{\"company\": \"Globex\", \"report_type\": \"summary\"}\n```";
        let ctx = parse_extraction(fenced).unwrap();
        assert_eq!(ctx.subject.as_deref(), Some("Globex"));
        assert_eq!(ctx.report_kind.as_deref(), Some("summary"));

        let prose = "Sure, here you go: {\"subject\": \"Initech\"} Hope that helps.";
        assert_eq!(parse_extraction(prose).unwrap().subject.as_deref(), Some("Initech"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_extraction("I could not find anything").is_none());
        assert!(parse_extraction("{\"subject\": \"Acme\"").is_none());
        assert!(parse_extraction("} nope {").is_none());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }
}
