//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the fetch relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, endpoint, inbound limits).
    pub listener: ListenerConfig,

    /// Upstream fetch policy.
    pub fetch: FetchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path of the relay endpoint.
    pub endpoint: String,

    /// Maximum size of a (compressed) inbound relay call in bytes.
    pub max_body_size: usize,

    /// Total time budget for one inbound call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            endpoint: "/fetch.py".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 300,
        }
    }
}

/// Upstream fetch policy shared by every relay call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of sequential upstream attempts per call.
    pub max_attempts: u32,

    /// Largest response body delivered to the caller, in bytes.
    pub max_response_bytes: u64,

    /// Deadline of the first attempt in seconds.
    pub base_deadline_secs: u64,

    /// Pause after a deadline or fetch failure (one time-unit).
    pub retry_delay_ms: u64,

    /// Pause after an unclassified failure (four time-units).
    pub unknown_error_delay_ms: u64,

    /// Shared secret callers must present. Empty disables the check.
    pub password: String,

    /// Skip upstream certificate verification.
    pub accept_invalid_certs: bool,
}

impl FetchConfig {
    /// Deadline of the first attempt.
    pub fn base_deadline(&self) -> Duration {
        Duration::from_secs(self.base_deadline_secs)
    }

    /// Pause after a deadline or fetch failure.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Pause after an unclassified failure.
    pub fn unknown_error_delay(&self) -> Duration {
        Duration::from_millis(self.unknown_error_delay_ms)
    }

    /// True when callers must present `password`.
    pub fn requires_password(&self) -> bool {
        !self.password.is_empty()
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_response_bytes: 1024 * 1024,
            base_deadline_secs: 30,
            retry_delay_ms: 1000,
            unknown_error_delay_ms: 4000,
            password: String::new(),
            accept_invalid_certs: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
