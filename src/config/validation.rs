//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, radius units known)
//! - Check upstream URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RhythmsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RhythmsConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &RhythmsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.upstream_secs", timeouts.upstream_secs),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than zero"));
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::new("rate_limit.window_secs", "must be greater than zero"));
        }
    }

    if config.auth.signup_code.trim().is_empty() {
        errors.push(ValidationError::new("auth.signup_code", "must not be empty"));
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.token_ttl_secs", "must be greater than zero"));
    }
    if !(4..=31).contains(&config.auth.bcrypt_cost) {
        errors.push(ValidationError::new("auth.bcrypt_cost", "must be between 4 and 31"));
    }
    if config.auth.users_db.trim().is_empty() {
        errors.push(ValidationError::new("auth.users_db", "must not be empty"));
    }

    let upstream = &config.upstream;
    for (field, value) in [
        ("upstream.jambase_base_url", &upstream.jambase_base_url),
        ("upstream.geocode_url", &upstream.geocode_url),
        ("upstream.distance_url", &upstream.distance_url),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
        }
    }
    if upstream.default_geo_radius == 0 {
        errors.push(ValidationError::new("upstream.default_geo_radius", "must be greater than zero"));
    }
    if !matches!(upstream.geo_radius_units.as_str(), "mi" | "km") {
        errors.push(ValidationError::new("upstream.geo_radius_units", "must be \"mi\" or \"km\""));
    }
    if !matches!(upstream.distance_units.as_str(), "imperial" | "metric") {
        errors.push(ValidationError::new(
            "upstream.distance_units",
            "must be \"imperial\" or \"metric\"",
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
