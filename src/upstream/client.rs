//! `reqwest`-backed transport.

use reqwest::header::{self, HeaderName};
use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

use crate::config::FetchConfig;
use crate::upstream::{FetchError, FetchErrorKind, Transport, UpstreamRequest, UpstreamResponse};

/// Headers owned by the transport connection, never forwarded from callers.
const MANAGED_HEADERS: [&str; 6] = [
    "host",
    "content-length",
    "connection",
    "transfer-encoding",
    "keep-alive",
    "proxy-connection",
];

/// Transport performing real round trips over the network.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_response_bytes: usize,
}

impl ReqwestTransport {
    /// Build a transport from the fetch policy.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .no_proxy()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            max_response_bytes: usize::try_from(config.max_response_bytes).unwrap_or(usize::MAX),
        })
    }
}

impl Transport for ReqwestTransport {
    async fn round_trip(
        &self,
        request: &UpstreamRequest,
        deadline: Duration,
    ) -> Result<UpstreamResponse, FetchError> {
        check_scheme(&request.url)?;

        let mut headers = request.headers.clone();
        for name in MANAGED_HEADERS {
            headers.remove(HeaderName::from_static(name));
        }
        let ranged = headers.contains_key(header::RANGE);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers)
            .timeout(deadline);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let mut response = builder.send().await.map_err(classify)?;
        let status = response.status();

        if let Some(declared) = response.content_length() {
            if !ranged && declared > self.max_response_bytes as u64 {
                return Err(too_large(declared));
            }
        }

        let headers = response.headers().clone();
        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            let room = self.max_response_bytes - body.len();
            if chunk.len() > room {
                if !ranged {
                    return Err(too_large((body.len() + chunk.len()) as u64));
                }
                body.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(UpstreamResponse {
            status,
            headers,
            body,
            truncated,
        })
    }
}

fn check_scheme(url: &Url) -> Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FetchError::new(
            FetchErrorKind::InvalidUrl,
            format!("{url}: unsupported scheme '{scheme}'"),
        )),
    }
}

fn too_large(size: u64) -> FetchError {
    FetchError::new(
        FetchErrorKind::ResponseTooLarge,
        format!("response body of at least {size} bytes exceeds the fetch limit"),
    )
}

fn classify(e: reqwest::Error) -> FetchError {
    let kind = if e.is_timeout() {
        FetchErrorKind::DeadlineExceeded
    } else if e.is_builder() {
        FetchErrorKind::InvalidUrl
    } else if e.is_connect() || e.is_request() || e.is_body() || e.is_redirect() {
        FetchErrorKind::FetchError
    } else {
        FetchErrorKind::Unknown
    };
    FetchError::new(kind, e.to_string())
}
