//! Length-prefixed response framing.
//!
//! ```text
//! byte 0      '1' (zlib stream follows) | '0' (raw bytes follow)
//! then        u32 BE status | u32 BE header length | u32 BE content length
//!             header block  | content
//! ```

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::codec::CodecError;

const TEXTUAL: u8 = b'1';
const BINARY: u8 = b'0';
const PREFIX_LEN: usize = 12;

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub status: u32,
    pub textual: bool,
    pub header: Vec<u8>,
    pub content: Vec<u8>,
}

/// Frame a response. Textual frames compress everything after the marker byte.
pub fn frame_response(
    status: u16,
    header: &[u8],
    content: &[u8],
    textual: bool,
) -> Result<Vec<u8>, CodecError> {
    let header_len = length_u32(header.len())?;
    let content_len = length_u32(content.len())?;

    let mut out = Vec::with_capacity(1 + PREFIX_LEN + header.len() + content.len());
    if textual {
        out.push(TEXTUAL);
        let mut encoder = ZlibEncoder::new(out, Compression::default());
        write_body(&mut encoder, status, header_len, content_len, header, content)?;
        Ok(encoder.finish()?)
    } else {
        out.push(BINARY);
        write_body(&mut out, status, header_len, content_len, header, content)?;
        Ok(out)
    }
}

fn write_body<W: Write>(
    w: &mut W,
    status: u16,
    header_len: u32,
    content_len: u32,
    header: &[u8],
    content: &[u8],
) -> std::io::Result<()> {
    w.write_all(&u32::from(status).to_be_bytes())?;
    w.write_all(&header_len.to_be_bytes())?;
    w.write_all(&content_len.to_be_bytes())?;
    w.write_all(header)?;
    w.write_all(content)
}

fn length_u32(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::TooLong(len))
}

/// Decode a frame produced by [`frame_response`].
pub fn parse_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let (&marker, rest) = bytes.split_first().ok_or(CodecError::Truncated)?;
    let (textual, body) = match marker {
        TEXTUAL => (true, inflate(rest)?),
        BINARY => (false, rest.to_vec()),
        other => return Err(CodecError::Marker(other)),
    };

    if body.len() < PREFIX_LEN {
        return Err(CodecError::Truncated);
    }
    let word = |i: usize| u32::from_be_bytes([body[i], body[i + 1], body[i + 2], body[i + 3]]);
    let status = word(0);
    let header_len = word(4) as usize;
    let content_len = word(8) as usize;

    let payload = &body[PREFIX_LEN..];
    if payload.len() != header_len + content_len {
        return Err(CodecError::Truncated);
    }
    let (header, content) = payload.split_at(header_len);

    Ok(Frame {
        status,
        textual,
        header: header.to_vec(),
        content: content.to_vec(),
    })
}

/// Decompress a zlib stream.
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(CodecError::Inflate)?;
    Ok(out)
}

/// Compress bytes into a zlib stream.
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
