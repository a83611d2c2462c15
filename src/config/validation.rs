//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoints must be literal `ip:port` pairs
//! - Timeouts must be non-zero
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid endpoint {value:?}, expected ip:port")]
    InvalidEndpoint { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("observability.log_level: unknown level {0:?}")]
    InvalidLogLevel(String),
}

/// Parse an `ip:port` endpoint string.
pub fn parse_endpoint(field: &'static str, value: &str) -> Result<SocketAddr, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidEndpoint {
        field,
        value: value.to_string(),
    })
}

/// Check a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_endpoint("receiver.endpoint", &config.receiver.endpoint) {
        errors.push(e);
    }
    if let Err(e) = parse_endpoint("sender.gateway_endpoint", &config.sender.gateway_endpoint) {
        errors.push(e);
    }

    if config.forwarder.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "forwarder.connect_timeout_secs" });
    }
    if config.forwarder.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "forwarder.request_timeout_secs" });
    }

    if config.observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled {
        if let Err(e) = parse_endpoint("observability.metrics_address", &config.observability.metrics_address) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
