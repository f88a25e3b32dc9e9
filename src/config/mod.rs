//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → RhythmsConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - API keys and the signup code may come from the environment instead of disk
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::RhythmsConfig;
pub use schema::{
    AuthConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, SecurityConfig,
    TimeoutConfig, UpstreamConfig,
};
