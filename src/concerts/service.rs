//! Concert search, detail and random-pick flows.
//!
//! # Data Flow
//! ```text
//! SearchParams
//!     → dates::window_is_valid   (reject before any network call)
//!     → Geocoder::resolve        (zip → origin)
//!     → ConcertSource::events    (one listing call)
//!     → normalize_with_distance  (per event, joined concurrently)
//!     → Vec<Concert> in upstream order
//!     → selector::pick_random    (random flow only)
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures_util::future::try_join_all;

use crate::concerts::dates::window_is_valid;
use crate::concerts::normalize::normalize_with_distance;
use crate::concerts::selector::pick_random;
use crate::concerts::types::{Concert, Coordinates, EventId};
use crate::error::{ApiError, ApiResult};
use crate::upstream::{ConcertSource, DistanceProvider, EventSearch, Geocoder};

/// Search filters as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub zip_code: String,
    pub geo_radius: Option<u32>,
}

/// Orchestrates the upstream collaborators for every concert flow.
#[derive(Clone)]
pub struct ConcertService {
    geocoder: Arc<dyn Geocoder>,
    source: Arc<dyn ConcertSource>,
    distances: Arc<dyn DistanceProvider>,
    default_geo_radius: u32,
}

impl ConcertService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        source: Arc<dyn ConcertSource>,
        distances: Arc<dyn DistanceProvider>,
        default_geo_radius: u32,
    ) -> Self {
        Self {
            geocoder,
            source,
            distances,
            default_geo_radius,
        }
    }

    /// Concerts near a zip code within a date window.
    pub async fn search(&self, params: &SearchParams) -> ApiResult<Vec<Concert>> {
        self.search_as_of(params, today()).await
    }

    pub async fn search_as_of(&self, params: &SearchParams, today: NaiveDate) -> ApiResult<Vec<Concert>> {
        let origin = self.resolve_window(params, today).await?;
        self.list(params.date_from, params.date_to, origin, params.geo_radius).await
    }

    /// One random concert near a zip code, optionally capped by price.
    pub async fn random(&self, params: &SearchParams, max_price: Option<f64>) -> ApiResult<Option<Concert>> {
        self.random_as_of(params, max_price, today()).await
    }

    pub async fn random_as_of(
        &self,
        params: &SearchParams,
        max_price: Option<f64>,
        today: NaiveDate,
    ) -> ApiResult<Option<Concert>> {
        let candidates = self.search_as_of(params, today).await?;
        let total = candidates.len();
        let picked = pick_random(candidates, max_price, &mut rand::thread_rng());

        tracing::debug!(
            candidates = total,
            max_price = ?max_price,
            picked = picked.as_ref().map(|c| c.id.as_str()),
            "Random concert selected"
        );
        Ok(picked)
    }

    /// Normalized concerts from one listing call, distances measured from `origin`.
    pub async fn list(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        origin: Coordinates,
        geo_radius: Option<u32>,
    ) -> ApiResult<Vec<Concert>> {
        let search = EventSearch {
            date_from,
            date_to,
            origin,
            geo_radius: geo_radius.unwrap_or(self.default_geo_radius),
        };

        let raw_events = self.source.events(&search).await?;
        tracing::info!(
            events = raw_events.len(),
            date_from = %date_from,
            date_to = %date_to,
            radius = search.geo_radius,
            "Fetched concert listing"
        );

        let distances = self.distances.as_ref();
        let concerts = try_join_all(
            raw_events
                .iter()
                .map(|raw| normalize_with_distance(raw, Some(origin), distances)),
        )
        .await?;
        Ok(concerts)
    }

    /// A single concert by identifier; distance only when `origin` is given.
    /// Fetch one concert. The identifier is checked before `zip_code` is
    /// geocoded, so a malformed id never costs an upstream call.
    pub async fn detail(&self, id: &str, zip_code: Option<&str>) -> ApiResult<Concert> {
        let event_id: EventId = id
            .parse()
            .map_err(|e: crate::concerts::types::InvalidEventId| ApiError::bad_request(e.to_string()))?;

        let origin = match zip_code {
            Some(zip) => Some(self.resolve_zip(zip).await?),
            None => None,
        };

        let raw = self.source.event(&event_id).await?;
        let concert = normalize_with_distance(&raw, origin, self.distances.as_ref()).await?;
        Ok(concert)
    }

    async fn resolve_zip(&self, zip_code: &str) -> ApiResult<Coordinates> {
        Ok(self.geocoder.resolve(zip_code).await?)
    }

    async fn resolve_window(&self, params: &SearchParams, today: NaiveDate) -> ApiResult<Coordinates> {
        if !window_is_valid(params.date_from, params.date_to, today) {
            return Err(ApiError::bad_request("invalid dates"));
        }
        self.resolve_zip(&params.zip_code).await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
