//! Third-party API clients.
//!
//! # Data Flow
//! ```text
//! concerts::service
//!     → Geocoder         (geocode.rs, zip code → coordinates)
//!     → ConcertSource    (jambase.rs, date window + origin → raw events)
//!     → DistanceProvider (distance.rs, origin + venue address → miles)
//! ```
//!
//! # Design Decisions
//! - Each upstream sits behind a trait so the service can be driven by fakes
//! - One shared reqwest client carries the connect/request timeouts
//! - No retries: any upstream failure is returned to the caller immediately

pub mod distance;
pub mod geocode;
pub mod jambase;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::concerts::raw::RawEvent;
use crate::concerts::types::{Coordinates, EventId};
use crate::config::TimeoutConfig;
use crate::error::ApiError;

pub use distance::GoogleDistance;
pub use geocode::GoogleGeocoder;
pub use jambase::JamBaseClient;

/// Error code JamBase uses for an identifier it does not recognize.
pub const IDENTIFIER_INVALID: &str = "identifier_invalid";

/// Errors from third-party API calls.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure, timeout, or unreadable body.
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Body was not the documented JSON shape.
    #[error("unexpected response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// The API answered but reported failure.
    #[error("{service} rejected the request ({code}): {message}")]
    Rejected {
        service: &'static str,
        code: String,
        message: String,
    },

    /// The API does not recognize the requested identifier.
    #[error("{service} does not recognize identifier {id}")]
    UnknownIdentifier { service: &'static str, id: String },

    /// Zip code did not resolve to a location.
    #[error("zip code {0} did not resolve")]
    UnresolvedZip(String),

    /// Distance matrix could not route between origin and destination.
    #[error("no route to {0}")]
    NoRoute(String),

    /// A raw event lacks the performer or venue data it cannot exist without.
    #[error("malformed event {id}: {reason}")]
    MalformedEvent { id: String, reason: &'static str },
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::UnknownIdentifier { .. } => ApiError::not_found("Concert not found"),
            UpstreamError::UnresolvedZip(_) => ApiError::bad_request("Invalid zip code"),
            UpstreamError::NoRoute(_) => ApiError::bad_request("Invalid origin or destination"),
            other => {
                tracing::warn!(error = %other, "Upstream call failed");
                ApiError::bad_request("Bad Request")
            }
        }
    }
}

/// Parameters for a listing query against the concert source.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSearch {
    pub date_from: chrono::NaiveDate,
    pub date_to: chrono::NaiveDate,
    pub origin: Coordinates,
    pub geo_radius: u32,
}

/// Resolves a postal code to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, zip_code: &str) -> Result<Coordinates, UpstreamError>;
}

/// Computes travel distance from an origin to a street address.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance(&self, origin: Coordinates, destination: &str) -> Result<f64, UpstreamError>;
}

/// Third-party concert listing API.
#[async_trait]
pub trait ConcertSource: Send + Sync {
    /// Events matching a date window and search area, in upstream order.
    async fn events(&self, search: &EventSearch) -> Result<Vec<RawEvent>, UpstreamError>;

    /// A single event by identifier.
    async fn event(&self, id: &EventId) -> Result<RawEvent, UpstreamError>;
}

/// Build the HTTP client shared by all upstream clients.
pub fn build_http_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .user_agent(concat!("random-rhythms/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a prepared request and decode its JSON body regardless of status.
///
/// Google and JamBase both describe failures inside the body, so the HTTP
/// status alone says little; it is only reported when the body is unusable.
pub(crate) async fn fetch_json<T>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, UpstreamError>
where
    T: serde::de::DeserializeOwned,
{
    let started = std::time::Instant::now();
    let response = request.send().await.map_err(|source| {
        crate::observability::metrics::record_upstream(service, "transport_error", started);
        UpstreamError::Http { service, source }
    })?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Http { service, source })?;

    match serde_json::from_slice(&body) {
        Ok(value) => {
            crate::observability::metrics::record_upstream(service, "ok", started);
            tracing::debug!(service, status = status.as_u16(), bytes = body.len(), "Upstream responded");
            Ok(value)
        }
        Err(e) => {
            crate::observability::metrics::record_upstream(service, "decode_error", started);
            Err(UpstreamError::Decode {
                service,
                message: format!("status {}: {}", status, e),
            })
        }
    }
}
