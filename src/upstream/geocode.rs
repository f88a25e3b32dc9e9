//! Zip code → coordinates via the Google geocoding API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::concerts::types::Coordinates;
use crate::config::UpstreamConfig;
use crate::upstream::{fetch_json, Geocoder, UpstreamError};

const SERVICE: &str = "google_geocode";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl GeocodeResponse {
    fn into_coordinates(self, zip_code: &str) -> Result<Coordinates, UpstreamError> {
        if self.status != "OK" {
            tracing::debug!(zip_code, status = %self.status, "Zip code did not geocode");
            return Err(UpstreamError::UnresolvedZip(zip_code.to_string()));
        }
        self.results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| UpstreamError::UnresolvedZip(zip_code.to_string()))
    }
}

/// Geocoder restricted to US postal codes.
#[derive(Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            url: config.geocode_url.clone(),
            api_key: config.google_api_key.clone(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, zip_code: &str) -> Result<Coordinates, UpstreamError> {
        let components = format!("postal_code:{}|country:US", zip_code);
        let request = self
            .http
            .get(&self.url)
            .query(&[("components", components.as_str()), ("key", self.api_key.as_str())]);

        let response: GeocodeResponse = fetch_json(SERVICE, request).await?;
        response.into_coordinates(zip_code)
    }
}
