//! Inbound relay request.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::codec::Fields;
use crate::relay::RelayError;
use crate::upstream::UpstreamRequest;

/// The request a caller asked the relay to perform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRequest {
    pub method: String,
    pub url: String,
    /// CRLF-separated `Name: Value` lines.
    pub headers: String,
    pub payload: Vec<u8>,
    pub password: Option<String>,
}

impl RelayRequest {
    /// Extract the known keys of a decoded message. Missing keys are empty.
    pub fn from_fields(mut fields: Fields) -> Self {
        let mut text = |key: &str| {
            fields
                .remove(key)
                .map(|v| String::from_utf8_lossy(&v).into_owned())
        };
        Self {
            method: text("method").unwrap_or_default(),
            url: text("url").unwrap_or_default(),
            headers: text("headers").unwrap_or_default(),
            password: text("password"),
            payload: fields.remove("payload").unwrap_or_default(),
        }
    }

    /// True when the URL names an HTTP(S) resource.
    pub fn has_http_scheme(&self) -> bool {
        self.url.starts_with("http")
    }

    /// Build the outbound request. An empty method means GET; a URL that
    /// does not parse is a construction failure.
    pub fn to_upstream(&self) -> Result<UpstreamRequest, RelayError> {
        let method = if self.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(self.method.as_bytes())
                .map_err(|e| RelayError::UpstreamConstruction(format!("method '{}': {e}", self.method)))?
        };

        let url = Url::parse(&self.url)
            .map_err(|e| RelayError::UpstreamConstruction(format!("url '{}': {e}", self.url)))?;

        Ok(UpstreamRequest {
            method,
            url,
            headers: parse_header_lines(&self.headers),
            body: self.payload.clone(),
        })
    }
}

/// Parse `Name: Value` lines. Later lines replace earlier ones; lines
/// without a colon or with an unusable name/value are skipped.
pub fn parse_header_lines(lines: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for line in lines.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::debug!(line = %line, "Skipping unusable header line"),
        }
    }
    headers
}
