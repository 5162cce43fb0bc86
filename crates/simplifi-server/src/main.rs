use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use simplifi::config::{default_config_path, Config};
use simplifi::risk::RiskAnalyzer;
use simplifi_server::{router, AppState};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "simplifi-server")]
#[command(about = "HTTP API server for the SimpliFi crypto dashboard")]
struct Args {
    /// Path to config file (defaults to ./simplifi.toml or the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides `server.bind`
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on, overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_env();

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);

    let analyzer = Arc::new(RiskAnalyzer::from_config(config)?);
    let app = router(AppState::new(analyzer));

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, config = %config_path.display(), "simplifi server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
