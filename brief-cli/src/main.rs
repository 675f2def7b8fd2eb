use anyhow::Result;
use brief_cli::cli::{Cli, Commands};
use brief_cli::{AppConfig, build_workflow, console, serve};
use brief_telemetry::LogFormat;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.log_format = Some(format);
    }

    let format = config
        .log_format
        .as_deref()
        .unwrap_or("pretty")
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    if let Err(e) = brief_telemetry::init_with_format("brief", format) {
        eprintln!("Failed to initialize telemetry: {e}");
    }

    match cli.command {
        Commands::Serve { port, host, allow_anonymous } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if allow_anonymous {
                config.require_user_id = false;
            }
            let workflow = build_workflow(&config).await?;
            serve::run_serve(workflow, &config).await
        }
        Commands::Console { user_id, transcript } => {
            let workflow = build_workflow(&config).await?;
            console::run_console(workflow, user_id, transcript.as_deref()).await
        }
    }
}
