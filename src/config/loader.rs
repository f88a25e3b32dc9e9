//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RhythmsConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override secrets and deployment settings.
pub const ENV_JAMBASE_API_KEY: &str = "RHYTHMS_JAMBASE_API_KEY";
pub const ENV_GOOGLE_API_KEY: &str = "RHYTHMS_GOOGLE_API_KEY";
pub const ENV_SIGNUP_CODE: &str = "RHYTHMS_SIGNUP_CODE";
pub const ENV_BIND_ADDRESS: &str = "RHYTHMS_BIND_ADDRESS";
pub const ENV_USERS_DB: &str = "RHYTHMS_USERS_DB";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RhythmsConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RhythmsConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Build configuration from defaults plus environment overrides.
pub fn default_config() -> Result<RhythmsConfig, ConfigError> {
    finalize(RhythmsConfig::default())
}

fn finalize(mut config: RhythmsConfig) -> Result<RhythmsConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from a variable lookup (normally the process environment).
pub fn apply_env_overrides<F>(config: &mut RhythmsConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty(ENV_JAMBASE_API_KEY) {
        config.upstream.jambase_api_key = key;
    }
    if let Some(key) = non_empty(ENV_GOOGLE_API_KEY) {
        config.upstream.google_api_key = key;
    }
    if let Some(code) = non_empty(ENV_SIGNUP_CODE) {
        config.auth.signup_code = code;
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(path) = non_empty(ENV_USERS_DB) {
        config.auth.users_db = path;
    }
}
