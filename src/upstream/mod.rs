//! Upstream fetch transport.
//!
//! # Responsibilities
//! - Describe one outbound request (method, URL, headers, body)
//! - Perform a single round trip bounded by a deadline
//! - Classify failures into a fixed set of kinds the retry loop acts on
//!
//! # Design Decisions
//! - The transport never retries; the retry controller owns that policy
//! - Failures carry a structured kind, never a message to pattern-match
//! - Oversize bodies are either rejected (`ResponseTooLarge`) or cut and
//!   flagged `truncated`, depending on whether a range was requested

pub mod client;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use client::ReqwestTransport;

/// An outbound request, mutated between attempts by the retry controller.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Response from one successful round trip.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// The body was cut at the size limit.
    pub truncated: bool,
}

/// Classification of a failed round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    DeadlineExceeded,
    FetchError,
    InvalidUrl,
    ResponseTooLarge,
    Unknown,
}

impl FetchErrorKind {
    /// Upper-case label used in logs and error lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::DeadlineExceeded => "DEADLINE_EXCEEDED",
            FetchErrorKind::FetchError => "FETCH_ERROR",
            FetchErrorKind::InvalidUrl => "INVALID_URL",
            FetchErrorKind::ResponseTooLarge => "RESPONSE_TOO_LARGE",
            FetchErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    /// Create an error of `kind` with a transport message.
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Performs one HTTP round trip with a deadline.
pub trait Transport: Send + Sync {
    fn round_trip(
        &self,
        request: &UpstreamRequest,
        deadline: Duration,
    ) -> impl Future<Output = Result<UpstreamResponse, FetchError>> + Send;
}
