use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simplifi::config::{default_config_path, Config};
use simplifi::duration::format_duration;
use simplifi::risk::RiskAnalyzer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "simplifi")]
#[command(about = "Crypto dashboard backend tools")]
struct Cli {
    /// Path to config file (defaults to ./simplifi.toml or the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the effective configuration
    Config,
    /// Run one rug pull risk analysis and print it as JSON
    Analyze {
        /// CoinGecko coin id, e.g. "bitcoin"
        coin_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_env();

    match cli.command {
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Listen: {}:{}", config.server.bind, config.server.port);
            println!("Market data: {}", config.market_data.base_url);
            println!("  API keys: {}", config.market_data.api_keys.len());
            println!(
                "  Min request interval: {}",
                format_duration(config.market_data.min_request_interval)
            );
            println!(
                "  Key rotation window: {}",
                format_duration(config.market_data.key_rotation_window)
            );
            println!("Language model: {} ({})", config.llm.model, config.llm.base_url);
            println!(
                "  API key: {}",
                if config.llm.api_key.is_some() { "set" } else { "not set" }
            );
            println!("Cache TTL: {}", format_duration(config.cache.ttl));
        }
        Command::Analyze { coin_id } => {
            let analyzer = RiskAnalyzer::from_config(config)?;
            let assessment = analyzer.analyze(&coin_id, None).await;
            let rendered = serde_json::to_string_pretty(&assessment)
                .context("Failed to render assessment")?;
            println!("{rendered}");
        }
    }

    Ok(())
}
