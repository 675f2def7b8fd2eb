use crate::ServerConfig;
use crate::translate::{EventTranslator, translate_stream};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Clone)]
pub struct ChatController {
    config: ServerConfig,
}

impl ChatController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

/// Clients send the user id as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Text(String),
    Number(i64),
}

impl UserId {
    fn into_string(self) -> Option<String> {
        match self {
            UserId::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            UserId::Number(n) => Some(n.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl ChatRequest {
    /// Bodies that are not a JSON object of the expected shape count as empty.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

pub async fn chat(State(controller): State<ChatController>, body: Bytes) -> Response {
    let request = ChatRequest::from_body(&body);

    let user_id = match request.user_id.and_then(UserId::into_string) {
        Some(id) => id,
        None if controller.config.require_user_id => return bad_request("Missing 'user_id'"),
        None => uuid::Uuid::new_v4().to_string(),
    };
    let Some(input) = request.input.filter(|input| !input.trim().is_empty()) else {
        return bad_request("Missing 'input'");
    };

    tracing::info!(user_id = %user_id, input_len = input.len(), "chat request");

    let config = &controller.config;
    let turn = config.workflow.clone().run_turn(&user_id, &input);
    let translator = EventTranslator::with_thought_tool(config.thought_tool.clone());
    let acknowledgement = config.acknowledge.then_some(input);

    let events = translate_stream(translator, acknowledgement, turn)
        .map(|event| Ok::<Event, Infallible>(event.to_axum()));

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}
