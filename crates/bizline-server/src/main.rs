//! Bizline Server CLI
//!
//! Starts the HTTP labeling service.

use anyhow::Context;
use bizline_server::{config::ServerConfig, start_server};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Bizline - business-line text classification service
#[derive(Parser, Debug)]
#[command(name = "bizline-server", version, about)]
struct Args {
    /// Load configuration from this TOML file
    #[arg(short, long, env = "BIZLINE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "bizline_server=info,bizline_classifier=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            warn!("No config file specified, using default test configuration");
            warn!("Usage: bizline-server --config <path-to-config.toml>");
            ServerConfig::default_test_config()
        }
    };

    start_server(config.apply_env_overrides())
        .await
        .context("server stopped")?;

    Ok(())
}
