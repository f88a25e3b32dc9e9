//! Random Rhythms concert discovery service library.

pub mod auth;
pub mod concerts;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::schema::RhythmsConfig;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
