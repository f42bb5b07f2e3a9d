//! Relay call entry point.

use std::sync::Arc;

use crate::codec;
use crate::config::FetchConfig;
use crate::relay::{FetchOutcome, Notification, RelayError, RelayRequest, RelayResponse};
use crate::resilience::RetryController;
use crate::upstream::Transport;

/// Decodes relay calls, validates them and runs the upstream fetch.
pub struct RelayHandler<T> {
    transport: T,
    policy: Arc<FetchConfig>,
}

impl<T: Transport> RelayHandler<T> {
    /// Create a handler relaying through `transport`.
    pub fn new(transport: T, policy: Arc<FetchConfig>) -> Self {
        Self { transport, policy }
    }

    /// Handle one compressed relay call body.
    pub async fn relay(&self, body: &[u8]) -> FetchOutcome {
        let request = match codec::inflate(body) {
            Ok(message) => RelayRequest::from_fields(codec::decode(&message)),
            Err(e) => {
                tracing::error!(error = %e, "Relay call body is not a zlib stream");
                return FetchOutcome::Notice(Notification::new("", "", &RelayError::from(e)));
            }
        };

        match self.fetch(&request).await {
            Ok(response) => FetchOutcome::Response(response),
            Err(err) => {
                tracing::info!(
                    method = %request.method,
                    url = %request.url,
                    status = err.status().as_u16(),
                    error = %err,
                    "Relay call failed"
                );
                FetchOutcome::Notice(Notification::new(&request.method, &request.url, &err))
            }
        }
    }

    async fn fetch(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError> {
        self.authorize(request)?;
        if !request.has_http_scheme() {
            return Err(RelayError::UnsupportedScheme);
        }

        let upstream = request.to_upstream()?;
        tracing::debug!(method = %upstream.method, url = %upstream.url, "Relaying request");

        RetryController::new(&self.transport, &self.policy)
            .run(upstream)
            .await
    }

    fn authorize(&self, request: &RelayRequest) -> Result<(), RelayError> {
        if !self.policy.requires_password() {
            return Ok(());
        }
        match request.password.as_deref() {
            Some(password) if password == self.policy.password => Ok(()),
            _ => Err(RelayError::WrongPassword),
        }
    }
}
