//! Wire codec.
//!
//! # Data Flow
//! ```text
//! inbound POST body
//!     → frame.rs (inflate)
//!     → message.rs (decode key=hex pairs)
//!
//! outbound response
//!     → message.rs (encode header block)
//!     → frame.rs (length-prefixed frame, zlib when textual)
//! ```

pub mod frame;
pub mod message;

use thiserror::Error;

pub use frame::{deflate, frame_response, inflate, parse_frame, Frame};
pub use message::{decode, encode, Fields};

/// Errors raised while framing or unframing relay payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("zlib stream is invalid: {0}")]
    Inflate(std::io::Error),

    #[error("I/O error while framing: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame is truncated")]
    Truncated,

    #[error("unknown frame marker {0:#04x}")]
    Marker(u8),

    #[error("block of {0} bytes does not fit a 32-bit length")]
    TooLong(usize),
}
