//! Hotspot relay.
//!
//! Sits between location-aware AR clients and a single content origin,
//! choosing which origin endpoint answers each request and rewriting the
//! origin's hotspot documents on the way back.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                  HOTSPOT RELAY                   │
//!                      │                                                  │
//!   Client Request     │  ┌────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ───────────────────┼─▶│  http  │──▶│  routing   │──▶│     net     │──┼──▶ Origin
//!                      │  │ server │   │ area, geo, │   │  transport  │  │
//!                      │  └────────┘   │  decision  │   └──────┬──────┘  │
//!                      │                └─────┬──────┘          │         │
//!   Client Response    │  ┌────────┐   ┌─────▼──────┐           │         │
//!   ◀──────────────────┼──│response│◀──│  document  │◀──────────┘         │
//!                      │  └────────┘   │  patching  │                     │
//!                      │               └────────────┘                     │
//!                      │  config · observability · lifecycle              │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hotspot_relay::config::loader::{load_config, with_bind_override};
use hotspot_relay::config::RelayConfig;
use hotspot_relay::lifecycle::startup;
use hotspot_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "hotspot-relay")]
#[command(about = "Request-routing relay for location-aware AR clients", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration.
    #[arg(short, long)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay (default)
    Serve,
    /// Validate the configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    let config = with_bind_override(config, cli.bind)?;

    init_logging(&config.observability);
    tracing::info!("hotspot-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Check => {
            tracing::info!(config = ?cli.config, "Configuration is valid");
        }
        Commands::Serve => {
            startup::run(config).await?;
            tracing::info!("Shutdown complete");
        }
    }
    Ok(())
}
