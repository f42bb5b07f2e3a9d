//! Remote HTTP-fetch relay.
//!
//! Accepts a compressed, hex-encoded description of an HTTP request,
//! performs it upstream with a bounded retry loop, and returns the result as
//! a length-prefixed frame inside a fixed `200 image/gif` envelope.

pub mod codec;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod upstream;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{FetchOutcome, RelayHandler};
