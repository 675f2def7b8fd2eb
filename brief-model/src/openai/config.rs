use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Whole-request timeout, including reading a streamed body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4.1".to_string(),
            base_url: None,
            temperature: Some(0.0),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Default::default() }
    }

    pub fn gpt_41(api_key: impl Into<String>) -> Self {
        Self::new(api_key, "gpt-4.1")
    }

    /// Smaller model, used for context extraction.
    pub fn gpt_41_mini(api_key: impl Into<String>) -> Self {
        Self::new(api_key, "gpt-4.1-mini")
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn chat_completions_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(OPENAI_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OpenAIConfig::gpt_41("sk-test");
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.temperature, Some(0.0));
        assert_eq!(config.chat_completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_custom_base_url_trailing_slash() {
        let config = OpenAIConfig::gpt_41_mini("key")
            .with_base_url("http://localhost:11434/v1/")
            .with_timeout(Duration::from_secs(10));
        assert_eq!(config.chat_completions_url(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
