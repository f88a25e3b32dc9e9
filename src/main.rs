//! random-rhythms: concert discovery API.
//!
//! ```text
//!   Client ──▶ axum router ──▶ auth / rate limit ──▶ ConcertService
//!                                                      │
//!                      ┌───────────────────────────────┼──────────────────┐
//!                      ▼                               ▼                  ▼
//!               Google Geocoding                JamBase events     Google Distance Matrix
//! ```

use random_rhythms::lifecycle::{signals, startup, Shutdown};
use random_rhythms::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = startup::config_path(std::env::args().skip(1), |key| std::env::var(key).ok());
    let config = startup::load(path)?;
    startup::init_observability(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        rate_limit = config.rate_limit.enabled,
        "random-rhythms starting"
    );

    let listener = startup::bind(&config).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
