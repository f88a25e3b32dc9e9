//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS preflight, response hardening headers)
//!     → rate_limit.rs (per-IP allowance on /concerts)
//!     → auth middleware (bearer token)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Rate limiting runs before authentication

pub mod headers;
pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
