//! Gemini Video MCP entry point.

use anyhow::Result;
use clap::Parser;
use gemini_video_mcp::cli::{commands, Cli, Commands};
use gemini_video_mcp::config::Settings;
use gemini_video_mcp::gemini::{LocalVideoRequest, RemoteVideoRequest};
use std::path::PathBuf;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. stdout carries JSON-RPC, so logs go to stderr.
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("gemini_video_mcp={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // A .env in the working directory never overrides real environment variables
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to load .env: {}", e);
        }
    }

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);

    // Execute command
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            commands::run_mcp(load_settings(&config_path)?).await?;
        }

        Commands::Check => {
            let settings = load_settings(&config_path)?;
            commands::run_check(&settings, &config_path.display().to_string())?;
        }

        Commands::Tools => {
            commands::run_tools()?;
        }

        Commands::AnalyzeLocal {
            file_path,
            prompt,
            mime_type,
            model,
        } => {
            let request = LocalVideoRequest {
                file_path,
                prompt,
                mime_type,
                model,
            };
            commands::run_analyze_local(request, load_settings(&config_path)?).await?;
        }

        Commands::AnalyzeRemote {
            video_url,
            prompt,
            model,
        } => {
            let request = RemoteVideoRequest {
                video_url,
                prompt,
                model,
            };
            commands::run_analyze_remote(request, load_settings(&config_path)?).await?;
        }
    }

    Ok(())
}

/// Load configuration. A missing API key is fatal.
fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    Settings::load_from(Some(config_path)).map_err(|e| {
        error!("Fatal error while loading configuration: {}", e);
        e.into()
    })
}
