//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay endpoint
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener with graceful shutdown
//! - Hand POST bodies to the relay handler and envelope the result

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::RelayConfig;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{envelope, landing_page};
use crate::observability::metrics;
use crate::relay::{FetchOutcome, RelayHandler};
use crate::upstream::{ReqwestTransport, Transport};

/// Application state injected into handlers.
pub struct AppState<T> {
    pub handler: Arc<RelayHandler<T>>,
    pub max_body_size: usize,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            max_body_size: self.max_body_size,
        }
    }
}

/// HTTP server for the fetch relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server relaying through the network transport.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&config.fetch)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a server relaying through `transport`.
    pub fn with_transport<T>(config: RelayConfig, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        let handler = Arc::new(RelayHandler::new(transport, Arc::new(config.fetch.clone())));
        let state = AppState {
            handler,
            max_body_size: config.listener.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<T>(config: &RelayConfig, state: AppState<T>) -> Router
    where
        T: Transport + 'static,
    {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route(
                &config.listener.endpoint,
                get(landing).post(relay_call::<T>),
            )
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(x_request_id))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.listener.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoint = %self.config.listener.endpoint,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

async fn landing() -> impl IntoResponse {
    landing_page()
}

/// Relay one POSTed call and envelope the framed outcome.
async fn relay_call<T>(State(state): State<AppState<T>>, request: Request<Body>) -> Response
where
    T: Transport + 'static,
{
    let start_time = Instant::now();
    let request_id = request_id(&request);

    let body = match axum::body::to_bytes(request.into_body(), state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read relay call body");
            metrics::record_relay("rejected", StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Relay call body too large").into_response();
        }
    };

    let span = tracing::info_span!("relay", request_id = %request_id);
    let outcome = state.handler.relay(&body).instrument(span).await;

    let label = match &outcome {
        FetchOutcome::Response(_) => "response",
        FetchOutcome::Notice(_) => "notice",
    };
    metrics::record_relay(label, outcome.status(), start_time);

    match outcome.to_frame() {
        Ok(frame) => envelope(frame),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to frame relay response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to frame response").into_response()
        }
    }
}
