//! Outer response envelope.
//!
//! Framed relay payloads always travel as `200 OK` with
//! `Content-Type: image/gif`; the true status and headers live inside the
//! frame so intermediaries see nothing that varies with the upstream result.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

pub const ENVELOPE_CONTENT_TYPE: &str = "image/gif";

/// Wrap a relay frame in the fixed outer envelope.
pub fn envelope(frame: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, ENVELOPE_CONTENT_TYPE)],
        Body::from(frame),
    )
        .into_response()
}

/// Informational page served on GET.
pub fn landing_page() -> Html<String> {
    let version = env!("CARGO_PKG_VERSION");
    Html(format!(
        "<html>\n<head><title>Fetch Relay {version}</title></head>\n<body>\n<h1>Fetch Relay {version} is running</h1>\n<p>POST compressed relay calls to this endpoint.</p>\n</body>\n</html>\n"
    ))
}
