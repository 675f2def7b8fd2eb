use crate::config::AppConfig;
use anyhow::Result;
use brief_agent::report_team;
use brief_core::Llm;
use brief_graph::{Checkpointer, ContextExtractor, ContextWorkflow, Dispatcher, MemoryCheckpointer};
use brief_model::{OpenAIClient, OpenAIConfig};
use std::sync::Arc;

fn openai(config: &AppConfig, model: &str) -> Result<Arc<dyn Llm>> {
    let mut openai = OpenAIConfig::new(config.api_key()?, model);
    if let Some(base_url) = &config.base_url {
        openai = openai.with_base_url(base_url);
    }
    Ok(Arc::new(OpenAIClient::new(openai)?))
}

pub async fn checkpointer(config: &AppConfig) -> Result<Arc<dyn Checkpointer>> {
    match config.database_url.as_deref() {
        None => Ok(Arc::new(MemoryCheckpointer::new())),
        #[cfg(feature = "sqlite")]
        Some(url) => {
            tracing::info!(database_url = url, "using sqlite checkpoints");
            Ok(Arc::new(brief_graph::SqliteCheckpointer::new(url).await?))
        }
        #[cfg(not(feature = "sqlite"))]
        Some(_) => anyhow::bail!("database_url is set but brief was built without the `sqlite` feature"),
    }
}

/// Wires the extractor, the report team and the checkpointer into a workflow.
pub async fn build_workflow(config: &AppConfig) -> Result<Arc<ContextWorkflow>> {
    let extractor = ContextExtractor::new(openai(config, &config.extraction_model)?);
    let team = report_team(openai(config, &config.model)?, config.stream)?;
    let workflow =
        ContextWorkflow::new(extractor, Dispatcher::new(Arc::new(team)), checkpointer(config).await?);
    Ok(Arc::new(workflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_api_key() {
        assert!(build_workflow(&AppConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_builds_with_key() {
        let config = AppConfig { api_key: Some("sk-test".into()), ..AppConfig::default() };
        let workflow = build_workflow(&config).await.unwrap();
        assert!(workflow.state("nobody").await.unwrap().is_none());
    }
}
