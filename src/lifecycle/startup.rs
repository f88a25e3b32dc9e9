//! Startup orchestration.
//!
//! # Responsibilities
//! - Locate and load configuration
//! - Initialize logging and metrics
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last so traffic only arrives once everything is ready

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::loader::{default_config, load_config};
use crate::config::{ConfigError, RhythmsConfig};
use crate::observability::{logging, metrics};

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "RHYTHMS_CONFIG";

/// Config path from the first CLI argument, else from `RHYTHMS_CONFIG`.
pub fn config_path<I, F>(mut args: I, env: F) -> Option<PathBuf>
where
    I: Iterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    args.next()
        .or_else(|| env(ENV_CONFIG_PATH))
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Load config from `path`, or defaults plus environment overrides.
pub fn load(path: Option<PathBuf>) -> Result<RhythmsConfig, ConfigError> {
    match path {
        Some(path) => load_config(&path),
        None => default_config(),
    }
}

/// Initialize logging and, when enabled, the metrics exporter.
pub fn init_observability(config: &RhythmsConfig) {
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// Bind the public listener.
pub async fn bind(config: &RhythmsConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_prefers_argument() {
        let path = config_path(vec!["cli.toml".to_string()].into_iter(), |_| Some("env.toml".into()));
        assert_eq!(path, Some(PathBuf::from("cli.toml")));
    }

    #[test]
    fn test_config_path_falls_back_to_env() {
        let path = config_path(std::iter::empty(), |key| {
            (key == ENV_CONFIG_PATH).then(|| "env.toml".to_string())
        });
        assert_eq!(path, Some(PathBuf::from("env.toml")));
        assert_eq!(config_path(std::iter::empty(), |_| None), None);
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let mut config = RhythmsConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
