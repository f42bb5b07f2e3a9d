//! Startup orchestration.
//!
//! Subsystems start in order and any failure is fatal: logging and metrics
//! first, then the upstream transport, then the listener last so traffic
//! only arrives once the relay is ready.

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Start the relay with a validated configuration and serve until signalled.
pub async fn start(config: RelayConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fetch-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.listener.endpoint,
        max_attempts = config.fetch.max_attempts,
        max_response_bytes = config.fetch.max_response_bytes,
        base_deadline_secs = config.fetch.base_deadline_secs,
        password_required = config.fetch.requires_password(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
