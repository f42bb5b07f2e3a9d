//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! compressed request body
//!     → handler.rs (inflate, decode, authorize, check scheme)
//!     → request.rs (RelayRequest → UpstreamRequest)
//!     → resilience::retries (attempt loop)
//!     → response.rs (collapse headers, cookie.rs folding, framing)
//! ```
//!
//! # Design Decisions
//! - Password and scheme checks stop the call
//! - Every call yields exactly one FetchOutcome
//! - Errors become framed HTML notifications, never transport failures

pub mod cookie;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;

pub use error::RelayError;
pub use handler::RelayHandler;
pub use request::RelayRequest;
pub use response::{FetchOutcome, Notification, RelayResponse};
