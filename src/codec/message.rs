//! Ampersand-joined `key=hex(value)` messages.
//!
//! Used for both the inbound request description and the header block of a
//! framed response. Keys are literal ASCII tokens; values are arbitrary bytes.

use std::collections::BTreeMap;

/// Decoded message fields.
pub type Fields = BTreeMap<String, Vec<u8>>;

/// Encode `(name, value)` pairs as `name=hex&name=hex...`.
pub fn encode<I, K, V>(fields: I) -> Vec<u8>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    let mut out = String::new();
    for (name, value) in fields {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(name.as_ref());
        out.push('=');
        out.push_str(&hex::encode(value.as_ref()));
    }
    out.into_bytes()
}

/// Decode a message. Empty and malformed segments are skipped.
pub fn decode(bytes: &[u8]) -> Fields {
    let mut fields = Fields::new();
    for segment in bytes.split(|b| *b == b'&') {
        if segment.is_empty() {
            continue;
        }
        let Some(eq) = segment.iter().position(|b| *b == b'=') else {
            tracing::debug!(segment = %String::from_utf8_lossy(segment), "Skipping segment without '='");
            continue;
        };
        let (name, value) = (&segment[..eq], &segment[eq + 1..]);
        match hex::decode(value) {
            Ok(value) => {
                fields.insert(String::from_utf8_lossy(name).into_owned(), value);
            }
            Err(e) => {
                tracing::debug!(
                    name = %String::from_utf8_lossy(name),
                    error = %e,
                    "Skipping segment with invalid hex value"
                );
            }
        }
    }
    fields
}
