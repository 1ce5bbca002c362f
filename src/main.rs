//! Dropdeck - localized dropdown configuration service
//!
//! CLI entry point for the Dropdeck server and maintenance commands.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use server::config::LogFormat;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod server;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dropdeck=info,dropdeck_core=info,dropdeck_store=info,tower_http=info".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let config = match server::load_config() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            return Err(e);
        }
    };
    init_tracing(config.logging.format);

    if !std::path::Path::new(".env").exists() {
        warn!(".env file not found; using config files and environment only");
    }

    cli::run(cli, config).await
}
