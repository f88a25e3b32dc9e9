//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RhythmsConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Registration and session settings.
    pub auth: AuthConfig,

    /// Third-party API endpoints and credentials.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Timeout configuration for inbound and outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for upstream APIs in seconds.
    pub connect_secs: u64,

    /// Total time allowed for a single upstream call in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 10,
            request_secs: 30,
        }
    }
}

/// Rate limiting configuration for the concert endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests allowed per client IP within one window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 30,
            window_secs: 15 * 60,
        }
    }
}

/// Registration and session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Code a new user must present to register.
    pub signup_code: String,

    /// Lifetime of an issued bearer token in seconds.
    pub token_ttl_secs: u64,

    /// bcrypt work factor for stored passwords (4..=31).
    pub bcrypt_cost: u32,

    /// SQLite file holding registered users. `":memory:"` keeps them for
    /// the life of the process only.
    pub users_db: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            signup_code: "CHANGE_ME".to_string(),
            token_ttl_secs: 24 * 60 * 60,
            bcrypt_cost: 12,
            users_db: "random-rhythms.db".to_string(),
        }
    }
}

/// Third-party API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// JamBase API base URL (events live under `{base}/events`).
    pub jambase_base_url: String,

    pub jambase_api_key: String,

    /// Google geocoding endpoint.
    pub geocode_url: String,

    /// Google distance matrix endpoint.
    pub distance_url: String,

    pub google_api_key: String,

    /// Search radius used when the client does not send one.
    pub default_geo_radius: u32,

    /// Radius units sent to JamBase ("mi" or "km").
    pub geo_radius_units: String,

    /// Unit system requested from the distance matrix ("imperial" or "metric").
    pub distance_units: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            jambase_base_url: "https://www.jambase.com/jb-api/v1".to_string(),
            jambase_api_key: String::new(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            distance_url: "https://maps.googleapis.com/maps/api/distancematrix/json".to_string(),
            google_api_key: String::new(),
            default_geo_radius: 50,
            geo_radius_units: "mi".to_string(),
            distance_units: "imperial".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: RhythmsConfig = toml::from_str(
            r#"
            [upstream]
            jambase_api_key = "jb-key"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.jambase_api_key, "jb-key");
        assert_eq!(config.upstream.default_geo_radius, 50);
        assert_eq!(config.upstream.geo_radius_units, "mi");
        assert_eq!(config.rate_limit.max_requests, 30);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3001");
        assert_eq!(config.auth.bcrypt_cost, 12);
        assert_eq!(config.auth.users_db, "random-rhythms.db");
    }
}
