use brief_core::{BriefError, Llm, LlmRequest, LlmResponse, LlmResponseStream, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Reply(LlmResponse),
    Fail(String),
}

/// A model that replays scripted turns, one per call, and records every request.
///
/// Calling it after the script runs out is a model error.
pub struct MockLlm {
    name: String,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<LlmRequest>>,
    streamed: Mutex<Vec<bool>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            streamed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: LlmResponse) -> Self {
        self.push(Scripted::Reply(response));
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(LlmResponse::new(text))
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    fn push(&self, turn: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(turn);
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The `stream` flag of every call, in call order.
    pub fn stream_flags(&self) -> Vec<bool> {
        self.streamed.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest, stream: bool) -> Result<LlmResponseStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req);
        }
        if let Ok(mut streamed) = self.streamed.lock() {
            streamed.push(stream);
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Scripted::Reply(response)) => {
                Ok(Box::pin(futures::stream::iter(vec![Ok::<_, BriefError>(response)])))
            }
            Some(Scripted::Fail(message)) => Err(BriefError::Model(message)),
            None => Err(BriefError::Model(format!("{}: no scripted response left", self.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::{Message, complete, complete_streaming};

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let mock = MockLlm::new("mock").with_text("first").with_error("boom").with_text("third");

        let req = LlmRequest::new(vec![Message::human("hi")]);
        assert_eq!(complete(&mock, req.clone()).await.unwrap().text, "first");
        assert!(complete(&mock, req.clone()).await.is_err());
        assert_eq!(complete(&mock, req.clone()).await.unwrap().text, "third");
        assert!(complete(&mock, req).await.is_err());
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockLlm::new("mock").with_text("ok");
        let req = LlmRequest::new(vec![Message::human("Q1 report")]).with_system("extract");
        complete(&mock, req).await.unwrap();

        let seen = mock.requests();
        assert_eq!(seen[0].system.as_deref(), Some("extract"));
        assert_eq!(seen[0].messages[0].content(), "Q1 report");
    }

    #[tokio::test]
    async fn test_records_stream_flag() {
        let mock = MockLlm::new("mock").with_text("a").with_text("b");
        let req = LlmRequest::new(vec![Message::human("hi")]);
        complete(&mock, req.clone()).await.unwrap();
        assert_eq!(complete_streaming(&mock, req).await.unwrap().text, "b");
        assert_eq!(mock.stream_flags(), vec![false, true]);
    }
}
