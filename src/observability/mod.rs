//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for production)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every request span by the trace layer
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
