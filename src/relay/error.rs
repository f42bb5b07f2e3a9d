//! Terminal relay errors, surfaced to callers as notification pages.

use axum::http::StatusCode;
use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Wrong Password.")]
    WrongPassword,

    #[error("Unsupported Scheme")]
    UnsupportedScheme,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream request construction failed: {0}")]
    UpstreamConstruction(String),

    #[error("Fetch Server Failed: [{}]", .0.join(", "))]
    ExhaustedRetries(Vec<String>),

    #[error("Malformed relay request: {0}")]
    MalformedRequest(#[from] CodecError),
}

impl RelayError {
    /// Status code reported inside the framed notification.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::WrongPassword => StatusCode::FORBIDDEN,
            RelayError::UnsupportedScheme | RelayError::InvalidUrl(_) => StatusCode::NOT_IMPLEMENTED,
            RelayError::UpstreamConstruction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::ExhaustedRetries(_) => StatusCode::BAD_GATEWAY,
            RelayError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RelayError::WrongPassword => "wrong_password",
            RelayError::UnsupportedScheme => "unsupported_scheme",
            RelayError::InvalidUrl(_) => "invalid_url",
            RelayError::UpstreamConstruction(_) => "construction_failed",
            RelayError::ExhaustedRetries(_) => "exhausted_retries",
            RelayError::MalformedRequest(_) => "malformed_request",
        }
    }
}
