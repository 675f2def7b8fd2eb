use crate::config::AppConfig;
use anyhow::Result;
use brief_graph::ContextWorkflow;
use brief_server::{ServerConfig, create_app};
use std::sync::Arc;

pub fn server_config(workflow: Arc<ContextWorkflow>, config: &AppConfig) -> ServerConfig {
    ServerConfig::new(workflow)
        .with_require_user_id(config.require_user_id)
        .with_allowed_origins(config.allowed_origins.clone())
}

pub async fn run_serve(workflow: Arc<ContextWorkflow>, config: &AppConfig) -> Result<()> {
    let app = create_app(server_config(workflow, config));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, model = %config.model, "brief server listening");
    println!("brief server starting on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
