//! Fetch relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Caller (client-side proxy)
//!        │  POST zlib(key=hex&...)
//!        ▼
//!   ┌─────────┐   ┌──────────────┐   ┌──────────────────┐   ┌───────────┐
//!   │  http   │──▶│    relay     │──▶│    resilience    │──▶│ upstream  │──▶ Internet
//!   │ server  │   │   handler    │   │ retry controller │   │ transport │
//!   └─────────┘   └──────────────┘   └──────────────────┘   └───────────┘
//!        ▲               │
//!        │               ▼
//!        │        ┌──────────────┐
//!        └────────│    codec     │  frame + 200 image/gif envelope
//!                 └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use fetch_relay::config::{load_config, RelayConfig};
use fetch_relay::lifecycle;

#[derive(Parser)]
#[command(name = "fetch-relay")]
#[command(about = "Relay encoded HTTP requests to the public internet", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    lifecycle::start(config).await?;
    Ok(())
}
