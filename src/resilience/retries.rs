//! Upstream retry controller.
//!
//! # States
//! ```text
//! Attempting → Success      transport returned a response
//! Attempting → Retrying     transient failure, attempts remain
//! Attempting → InvalidUrl   terminal, never retried
//! Attempting → Abandoned    every attempt failed
//! ```
//!
//! # Failure Handling
//! | kind               | pause          | deadline | other              |
//! |--------------------|----------------|----------|--------------------|
//! | DeadlineExceeded   | retry delay    | doubled  |                    |
//! | FetchError         | retry delay    | doubled  |                    |
//! | InvalidUrl         | -              | -        | abandon with 501   |
//! | ResponseTooLarge   | none           | doubled  | add `Range` header |
//! | Unknown            | unknown delay  | kept     |                    |
//!
//! Attempts are strictly sequential: the `Range` header and the deadline set
//! by one attempt feed the next.

use reqwest::header::{HeaderValue, RANGE};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::observability::metrics;
use crate::relay::{RelayError, RelayResponse};
use crate::resilience::backoff::Deadline;
use crate::upstream::{FetchErrorKind, Transport, UpstreamRequest};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry {
        pause: Duration,
        double_deadline: bool,
        request_range: bool,
    },
    Abandon,
}

/// Map a failure kind to the retry action.
pub fn decide(kind: FetchErrorKind, policy: &FetchConfig) -> RetryAction {
    match kind {
        FetchErrorKind::DeadlineExceeded | FetchErrorKind::FetchError => RetryAction::Retry {
            pause: policy.retry_delay(),
            double_deadline: true,
            request_range: false,
        },
        FetchErrorKind::InvalidUrl => RetryAction::Abandon,
        FetchErrorKind::ResponseTooLarge => RetryAction::Retry {
            pause: Duration::ZERO,
            double_deadline: true,
            request_range: true,
        },
        FetchErrorKind::Unknown => RetryAction::Retry {
            pause: policy.unknown_error_delay(),
            double_deadline: false,
            request_range: false,
        },
    }
}

/// Drives the attempt loop for one relay call.
pub struct RetryController<'a, T> {
    transport: &'a T,
    policy: &'a FetchConfig,
}

impl<'a, T: Transport> RetryController<'a, T> {
    /// Create a controller over `transport` governed by `policy`.
    pub fn new(transport: &'a T, policy: &'a FetchConfig) -> Self {
        Self { transport, policy }
    }

    /// Fetch `request`, retrying transient failures.
    pub async fn run(&self, mut request: UpstreamRequest) -> Result<RelayResponse, RelayError> {
        let mut deadline = Deadline::new(self.policy.base_deadline());
        let mut errors = Vec::new();

        for attempt in 1..=self.policy.max_attempts {
            let err = match self.transport.round_trip(&request, deadline.current()).await {
                Ok(response) => {
                    if response.truncated {
                        tracing::error!(
                            url = %request.url,
                            delivered = response.body.len(),
                            "Upstream body truncated at fetch limit"
                        );
                    }
                    tracing::debug!(url = %request.url, attempt, status = %response.status, "Upstream fetch succeeded");
                    return Ok(RelayResponse::from_upstream(response));
                }
                Err(err) => err,
            };

            metrics::record_fetch_failure(err.kind);

            let RetryAction::Retry {
                pause,
                double_deadline,
                request_range,
            } = decide(err.kind, self.policy)
            else {
                tracing::warn!(url = %request.url, error = %err.message, "Upstream rejected URL");
                return Err(RelayError::InvalidUrl(err.message));
            };

            tracing::error!(
                kind = %err.kind,
                attempt,
                deadline_secs = deadline.current().as_secs_f64(),
                url = %request.url,
                error = %err.message,
                "Upstream fetch failed"
            );
            errors.push(err.to_string());

            if request_range {
                let range = format!("bytes=0-{}", self.policy.max_response_bytes);
                if let Ok(value) = HeaderValue::from_str(&range) {
                    request.headers.insert(RANGE, value);
                }
            }
            if double_deadline {
                deadline.double();
            }
            if attempt < self.policy.max_attempts && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        Err(RelayError::ExhaustedRetries(errors))
    }
}
