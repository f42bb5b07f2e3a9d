//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay calls produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a call
//! - Metrics are cheap (atomic increments) and optional to expose

pub mod logging;
pub mod metrics;
