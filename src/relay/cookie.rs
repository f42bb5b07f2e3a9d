//! `Set-Cookie` folding.
//!
//! Upstream transports may hand back every `Set-Cookie` value joined by
//! `", "`. Splitting on that separator also splits `Expires=Thu, 01 Jan ...`
//! dates, so a fragment that opens with a bare token and a space is glued
//! back onto the cookie before it.

use regex::Regex;
use std::sync::LazyLock;

/// Separator used when re-emitting folded cookies as header lines.
pub const COOKIE_LINE_SEPARATOR: &str = "\r\nSet-Cookie: ";

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[^ =]+ ").expect("static regex"));

/// Split a comma-joined `Set-Cookie` value into individual cookies.
pub fn split_cookies(value: &str) -> Vec<String> {
    let mut cookies: Vec<String> = Vec::new();
    for fragment in value.split(", ") {
        match cookies.last_mut() {
            Some(last) if CONTINUATION.is_match(fragment) => {
                last.push_str(", ");
                last.push_str(fragment);
            }
            _ => cookies.push(fragment.to_string()),
        }
    }
    cookies
}

/// Fold a comma-joined `Set-Cookie` value into one multi-line header value.
pub fn fold_set_cookie(value: &str) -> String {
    split_cookies(value).join(COOKIE_LINE_SEPARATOR)
}
