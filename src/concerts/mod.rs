//! Concert aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! raw.rs (JamBase record shapes)
//!     → normalize.rs (raw → Concert, optional distance)
//!     → service.rs (search / detail / random orchestration)
//!     → selector.rs (price filter + uniform pick)
//! dates.rs gates every search before the first network call.
//! ```
//!
//! # Design Decisions
//! - Concerts are built per request and never stored
//! - Missing cost and ticket URL use the empty string, never null
//! - Upstream order is preserved; no sorting by date or distance

pub mod dates;
pub mod normalize;
pub mod raw;
pub mod selector;
pub mod service;
pub mod types;

pub use dates::{validate_dates, validate_dates_as_of};
pub use service::{ConcertService, SearchParams};
pub use types::{Concert, Coordinates, EventId, Headliner, Venue};
