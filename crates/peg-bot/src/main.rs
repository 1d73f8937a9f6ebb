//! Depth-pegged re-quoting bot - entry point.
//!
//! Runs the repricing loop against the built-in paper exchange. A live
//! venue plugs in through the `ExchangeClient` trait in `peg-exchange`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Depth-pegged single-order re-quoting bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PEG_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    peg_telemetry::init_logging()?;

    info!("Starting peg-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config.or_else(|| std::env::var("PEG_CONFIG").ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            peg_bot::AppConfig::from_file(&path)?
        }
        None => peg_bot::AppConfig::load()?,
    };

    info!(
        symbol = %config.strategy.symbol,
        quantity = %config.strategy.quantity,
        "Configuration loaded"
    );

    let (sim, events) = peg_exchange::SimExchange::new(config.sim.clone());
    let client = Arc::new(sim);

    let app = peg_bot::Application::new(config, client, events)?;
    app.run().await?;

    Ok(())
}
