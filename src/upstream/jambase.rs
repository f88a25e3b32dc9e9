//! JamBase events API client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::concerts::raw::{null_as_default, RawEvent};
use crate::concerts::types::EventId;
use crate::config::UpstreamConfig;
use crate::upstream::{fetch_json, ConcertSource, EventSearch, UpstreamError, IDENTIFIER_INVALID};

const SERVICE: &str = "jambase";

/// Response envelope shared by the listing and detail endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    events: Vec<RawEvent>,
    #[serde(default)]
    event: Option<RawEvent>,
    #[serde(default, deserialize_with = "null_as_default")]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    message: String,
}

impl Envelope {
    fn rejection(self) -> UpstreamError {
        let first = self.errors.into_iter().next();
        UpstreamError::Rejected {
            service: SERVICE,
            code: first.as_ref().map(|e| e.code.clone()).unwrap_or_else(|| "unknown".to_string()),
            message: first.map(|e| e.message).unwrap_or_default(),
        }
    }

    fn into_events(self) -> Result<Vec<RawEvent>, UpstreamError> {
        if self.success {
            Ok(self.events)
        } else {
            Err(self.rejection())
        }
    }

    fn into_event(self, id: &EventId) -> Result<RawEvent, UpstreamError> {
        if self.success {
            return self.event.ok_or_else(|| UpstreamError::Decode {
                service: SERVICE,
                message: format!("success without event for {}", id),
            });
        }

        let unknown = self.errors.first().is_some_and(|e| e.code == IDENTIFIER_INVALID);
        if unknown {
            Err(UpstreamError::UnknownIdentifier {
                service: SERVICE,
                id: id.to_string(),
            })
        } else {
            Err(self.rejection())
        }
    }
}

/// Client for `https://www.jambase.com/jb-api/v1`.
#[derive(Clone)]
pub struct JamBaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    radius_units: String,
}

impl JamBaseClient {
    pub fn new(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.jambase_base_url.trim_end_matches('/').to_string(),
            api_key: config.jambase_api_key.clone(),
            radius_units: config.geo_radius_units.clone(),
        }
    }
}

#[async_trait]
impl ConcertSource for JamBaseClient {
    async fn events(&self, search: &EventSearch) -> Result<Vec<RawEvent>, UpstreamError> {
        let request = self.http.get(format!("{}/events", self.base_url)).query(&[
            ("eventDateFrom", search.date_from.to_string()),
            ("eventDateTo", search.date_to.to_string()),
            ("geoLatitude", search.origin.lat.to_string()),
            ("geoLongitude", search.origin.lng.to_string()),
            ("geoRadiusAmount", search.geo_radius.to_string()),
            ("geoRadiusUnits", self.radius_units.clone()),
            ("apikey", self.api_key.clone()),
        ]);

        let envelope: Envelope = fetch_json(SERVICE, request).await?;
        envelope.into_events()
    }

    async fn event(&self, id: &EventId) -> Result<RawEvent, UpstreamError> {
        let request = self
            .http
            .get(format!("{}/events/id/{}", self.base_url, id))
            .query(&[("apikey", self.api_key.as_str())]);

        let envelope: Envelope = fetch_json(SERVICE, request).await?;
        envelope.into_event(id)
    }
}
