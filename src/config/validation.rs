//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. All problems are
//! reported at once rather than stopping at the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.endpoint '{0}' must start with '/'")]
    Endpoint(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if !config.listener.endpoint.starts_with('/') {
        errors.push(ValidationError::Endpoint(config.listener.endpoint.clone()));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::Zero("listener.max_body_size"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("listener.request_timeout_secs"));
    }
    if config.fetch.max_attempts == 0 {
        errors.push(ValidationError::Zero("fetch.max_attempts"));
    }
    if config.fetch.max_response_bytes == 0 {
        errors.push(ValidationError::Zero("fetch.max_response_bytes"));
    }
    if config.fetch.base_deadline_secs == 0 {
        errors.push(ValidationError::Zero("fetch.base_deadline_secs"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
