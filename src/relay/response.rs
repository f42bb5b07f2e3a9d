//! Relay responses and their wire rendering.

use reqwest::header::HeaderMap;
use std::collections::BTreeMap;

use crate::codec::{self, CodecError};
use crate::relay::cookie::fold_set_cookie;
use crate::relay::RelayError;
use crate::upstream::UpstreamResponse;

/// An upstream result ready to frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub content: Vec<u8>,
}

impl RelayResponse {
    /// Collapse upstream headers to one value per name, folding `Set-Cookie`.
    pub fn from_upstream(upstream: UpstreamResponse) -> Self {
        let status = upstream.status.as_u16();
        let mut headers = collapse_headers(&upstream.headers);

        if status == 206 {
            headers.insert("Accept-Ranges".into(), "bytes".into());
            headers.insert("Content-Length".into(), upstream.body.len().to_string());
        }
        headers.insert("Connection".into(), "close".into());

        Self {
            status,
            headers,
            content: upstream.body,
        }
    }

    /// True when the declared content type is `text/*`.
    pub fn is_textual(&self) -> bool {
        self.headers
            .get("Content-Type")
            .is_some_and(|v| v.starts_with("text/"))
    }

    /// Render into the length-prefixed wire frame.
    pub fn to_frame(&self) -> Result<Vec<u8>, CodecError> {
        let header = codec::encode(&self.headers);
        codec::frame_response(self.status, &header, &self.content, self.is_textual())
    }
}

fn collapse_headers(upstream: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for name in upstream.keys() {
        let mut values = upstream
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        let value = if name.as_str().eq_ignore_ascii_case("set-cookie") {
            fold_set_cookie(&values.collect::<Vec<_>>().join(", "))
        } else {
            values.next().unwrap_or_default()
        };
        headers.insert(canonical_header_name(name.as_str()), value);
    }
    headers
}

/// `content-type` → `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// A relay-level error reported to the caller as an HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub message: String,
}

impl Notification {
    /// Describe `err` for the call `method url`.
    pub fn new(method: &str, url: &str, err: &RelayError) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            status: err.status().as_u16(),
            message: err.to_string(),
        }
    }

    /// Render as a `text/html` relay response carrying the error status.
    pub fn to_response(&self) -> RelayResponse {
        let content = format!(
            "<h2>Fetch Relay Info</h2><hr noshade='noshade'><p>{} '{}'</p><p>Return Code: {}</p><p>Message: {}</p>",
            escape_html(&self.method),
            escape_html(&self.url),
            self.status,
            escape_html(&self.message),
        );
        RelayResponse {
            status: self.status,
            headers: BTreeMap::from([("Content-Type".to_string(), "text/html".to_string())]),
            content: content.into_bytes(),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Result of one relay call: exactly one of a response or a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response(RelayResponse),
    Notice(Notification),
}

impl FetchOutcome {
    /// Status carried inside the frame.
    pub fn status(&self) -> u16 {
        match self {
            FetchOutcome::Response(r) => r.status,
            FetchOutcome::Notice(n) => n.status,
        }
    }

    pub fn to_frame(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            FetchOutcome::Response(r) => r.to_frame(),
            FetchOutcome::Notice(n) => n.to_response().to_frame(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use reqwest::StatusCode;

    fn upstream(status: u16, headers: &[(&'static str, &'static str)], body: &[u8]) -> UpstreamResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, HeaderValue::from_static(*value));
        }
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: map,
            body: body.to_vec(),
            truncated: false,
        }
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("x-xss-PROTECTION"), "X-Xss-Protection");
        assert_eq!(canonical_header_name("etag"), "Etag");
    }

    #[test]
    fn test_multi_valued_headers_collapse_to_first() {
        let response = RelayResponse::from_upstream(upstream(
            200,
            &[("vary", "accept"), ("vary", "origin"), ("content-length", "2")],
            b"ok",
        ));
        assert_eq!(response.headers["Vary"], "accept");
        assert_eq!(response.headers["Content-Length"], "2");
        assert_eq!(response.headers["Connection"], "close");
        assert!(!response.headers.contains_key("Accept-Ranges"));
    }

    #[test]
    fn test_set_cookie_values_are_folded() {
        let response = RelayResponse::from_upstream(upstream(
            200,
            &[
                ("set-cookie", "id=1; Expires=Thu, 01 Jan 2030 00:00:00 GMT"),
                ("set-cookie", "sess=2; Path=/"),
            ],
            b"",
        ));
        assert_eq!(
            response.headers["Set-Cookie"],
            "id=1; Expires=Thu, 01 Jan 2030 00:00:00 GMT\r\nSet-Cookie: sess=2; Path=/"
        );
    }

    #[test]
    fn test_partial_content_gets_range_headers() {
        let response = RelayResponse::from_upstream(upstream(206, &[("content-length", "999")], b"12345"));
        assert_eq!(response.headers["Accept-Ranges"], "bytes");
        assert_eq!(response.headers["Content-Length"], "5");
    }

    #[test]
    fn test_textual_frames_are_compressed() {
        let text = RelayResponse::from_upstream(upstream(200, &[("content-type", "text/css")], b"a{}"));
        let image = RelayResponse::from_upstream(upstream(200, &[("content-type", "image/png")], b"\x89PNG"));
        assert!(text.is_textual());
        assert!(!image.is_textual());
        assert_eq!(text.to_frame().unwrap()[0], b'1');

        let frame = codec::parse_frame(&image.to_frame().unwrap()).unwrap();
        assert!(!frame.textual);
        assert_eq!(frame.content, b"\x89PNG");
        assert_eq!(codec::decode(&frame.header)["Content-Type"], b"image/png");
    }

    #[test]
    fn test_notification_page() {
        let notice = Notification::new("GET", "ftp://x/<y>", &RelayError::UnsupportedScheme);
        let response = notice.to_response();

        assert_eq!(response.status, 501);
        assert!(response.is_textual());
        let page = String::from_utf8(response.content).unwrap();
        assert!(page.contains("<p>GET 'ftp://x/&lt;y&gt;'</p>"));
        assert!(page.contains("Return Code: 501"));
        assert!(page.contains("Message: Unsupported Scheme"));
    }
}
