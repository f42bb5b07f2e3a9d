//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream request for one relay call:
//!     → retries.rs (attempt, classify failure, decide)
//!     → backoff.rs (grow the per-attempt deadline)
//!     → transport (one bounded round trip per attempt)
//! ```
//!
//! # Design Decisions
//! - Every upstream attempt has a deadline
//! - Invalid URLs are never retried
//! - Only the aggregate failure after the last attempt reaches the caller

pub mod backoff;
pub mod retries;

pub use retries::{RetryAction, RetryController};
