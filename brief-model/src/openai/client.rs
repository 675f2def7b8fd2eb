use super::config::OpenAIConfig;
use super::convert::{self, ChatCompletionRequest, ChatCompletionResponse, ResponseFormat};
use super::stream::StreamDecoder;
use crate::retry::{
    RetryConfig, execute_with_retry, is_retryable_model_error, is_retryable_status_code,
};
use brief_core::{BriefError, Llm, LlmRequest, LlmResponseStream};
use brief_telemetry::Instrument;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

/// Client for OpenAI-compatible chat completion endpoints.
///
/// ```rust,ignore
/// use brief_model::{OpenAIClient, OpenAIConfig};
///
/// let client = OpenAIClient::new(OpenAIConfig::gpt_41(std::env::var("OPENAI_API_KEY")?))?;
/// ```
pub struct OpenAIClient {
    client: Client,
    config: OpenAIConfig,
    retry_config: RetryConfig,
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Result<Self, BriefError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BriefError::Model(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn build_request(&self, request: &LlmRequest, stream: bool) -> ChatCompletionRequest {
        let messages = convert::build_messages(request.system.as_deref(), &request.messages);
        let tools =
            if request.tools.is_empty() { None } else { Some(convert::convert_tools(&request.tools)) };
        let config = request.config.as_ref();

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: config.and_then(|c| c.temperature).or(self.config.temperature),
            max_tokens: config.and_then(|c| c.max_output_tokens).or(self.config.max_tokens),
            stream: Some(stream),
            tools,
            response_format: config
                .filter(|c| c.json_mode)
                .map(|_| ResponseFormat { format_type: "json_object".to_string() }),
        }
    }
}

#[async_trait]
impl Llm for OpenAIClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(
        &self,
        request: LlmRequest,
        stream: bool,
    ) -> Result<LlmResponseStream, BriefError> {
        let api_url = self.config.chat_completions_url();
        let api_key = self.config.api_key.clone();
        let chat_request = self.build_request(&request, stream);
        let client = self.client.clone();
        let retry_config = self.retry_config.clone();
        let span = brief_telemetry::model_call_span(&self.config.model);

        let response_stream = try_stream! {
            // Only request setup is retried; a stream that fails midway is surfaced as is.
            let response = execute_with_retry(&retry_config, is_retryable_model_error, || {
                let client = client.clone();
                let api_url = api_url.clone();
                let api_key = api_key.clone();
                let chat_request = chat_request.clone();
                async move {
                    let response = client
                        .post(&api_url)
                        .bearer_auth(&api_key)
                        .json(&chat_request)
                        .send()
                        .await
                        .map_err(|e| {
                            let hint = if e.is_timeout() { "timed out" } else { "failed" };
                            BriefError::Model(format!("API request {}: {}", hint, e))
                        })?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let error_text = response.text().await.unwrap_or_default();
                        let retryability = if is_retryable_status_code(status.as_u16()) {
                            "retryable"
                        } else {
                            "non-retryable"
                        };
                        return Err(BriefError::Model(format!(
                            "API error ({}, {}): {}",
                            status.as_u16(), retryability, error_text
                        )));
                    }

                    Ok(response)
                }
                .instrument(span.clone())
            })
            .await?;

            if stream {
                let mut byte_stream = response.bytes_stream();
                let mut decoder = StreamDecoder::new();
                while let Some(chunk) = byte_stream.next().await {
                    let chunk = chunk
                        .map_err(|e| BriefError::Model(format!("Stream read error: {}", e)))?;
                    for response in decoder.push(&chunk) {
                        yield response;
                    }
                }
                for response in decoder.finish() {
                    yield response;
                }
            } else {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| BriefError::Model(format!("Failed to read response: {}", e)))?;

                let chat_response: ChatCompletionResponse = serde_json::from_str(&response_text)
                    .map_err(|e| {
                        BriefError::Model(format!("Failed to parse response: {} - {}", e, response_text))
                    })?;

                yield convert::from_response(&chat_response);
            }
        };

        Ok(Box::pin(response_stream))
    }
}
