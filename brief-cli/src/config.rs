use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4.1-mini";

/// Launcher settings. Sources apply in order: TOML file, environment, command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub extraction_model: String,
    pub base_url: Option<String>,
    /// SQLite URL for conversation checkpoints. Unset keeps them in memory.
    pub database_url: Option<String>,
    /// Stream report-team model replies.
    pub stream: bool,
    pub host: String,
    pub port: u16,
    pub require_user_id: bool,
    pub allowed_origins: Vec<String>,
    pub log_format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            base_url: None,
            database_url: None,
            stream: true,
            host: "0.0.0.0".to_string(),
            port: 8080,
            require_user_id: true,
            allowed_origins: Vec::new(),
            log_format: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration file")
    }

    /// Reads `path` if given, then applies the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Overlays values found through `lookup`; empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("OPENAI_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = get("BRIEF_MODEL") {
            self.model = v;
        }
        if let Some(v) = get("BRIEF_EXTRACTION_MODEL") {
            self.extraction_model = v;
        }
        if let Some(v) = get("BRIEF_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = get("BRIEF_DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = get("BRIEF_STREAM") {
            self.stream = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off");
        }
        self
    }

    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => bail!("OPENAI_API_KEY is not set and the configuration file has no api_key"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_toml_then_env() {
        let config = AppConfig::from_toml_str(
            r#"
            model = "gpt-4o"
            port = 9000
            allowed_origins = ["https://example.com"]
            "#,
        )
        .unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.extraction_model, DEFAULT_EXTRACTION_MODEL);
        assert_eq!(config.port, 9000);

        let env: HashMap<&str, &str> =
            [
                ("BRIEF_MODEL", "gpt-4.1-nano"),
                ("OPENAI_API_KEY", "sk-test"),
                ("BRIEF_BASE_URL", ""),
                ("BRIEF_STREAM", "off"),
            ]
                .into_iter()
                .collect();
        let config = config.with_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.model, "gpt-4.1-nano");
        assert_eq!(config.api_key().unwrap(), "sk-test");
        assert!(config.base_url.is_none());
        assert!(!config.stream);
    }

    #[test]
    fn test_missing_key() {
        assert!(AppConfig::default().api_key().is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.toml");
        std::fs::write(&path, "require_user_id = false\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(!config.require_user_id);
    }
}
