//! Origin → venue travel distance via the Google distance matrix API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::concerts::types::Coordinates;
use crate::config::UpstreamConfig;
use crate::upstream::{fetch_json, DistanceProvider, UpstreamError};

const SERVICE: &str = "google_distance";

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    #[serde(default)]
    status: String,
    distance: Option<MatrixDistance>,
}

#[derive(Debug, Deserialize)]
struct MatrixDistance {
    text: String,
}

impl MatrixResponse {
    fn into_distance(self, destination: &str) -> Result<f64, UpstreamError> {
        let no_route = || UpstreamError::NoRoute(destination.to_string());
        if self.status != "OK" {
            return Err(no_route());
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(no_route)?;
        if element.status != "OK" {
            return Err(no_route());
        }

        let text = element.distance.map(|d| d.text).ok_or_else(no_route)?;
        parse_distance_text(&text).ok_or_else(|| UpstreamError::Decode {
            service: SERVICE,
            message: format!("unreadable distance '{}'", text),
        })
    }
}

/// Strip the unit suffix from text like "9.8 mi" or "1,204 km".
pub fn parse_distance_text(text: &str) -> Option<f64> {
    let number = text.split_whitespace().next()?;
    number.replace(',', "").parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Distance matrix client for a single origin/destination pair per call.
#[derive(Clone)]
pub struct GoogleDistance {
    http: reqwest::Client,
    url: String,
    api_key: String,
    units: String,
}

impl GoogleDistance {
    pub fn new(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            url: config.distance_url.clone(),
            api_key: config.google_api_key.clone(),
            units: config.distance_units.clone(),
        }
    }
}

#[async_trait]
impl DistanceProvider for GoogleDistance {
    async fn distance(&self, origin: Coordinates, destination: &str) -> Result<f64, UpstreamError> {
        let origins = format!("{},{}", origin.lat, origin.lng);
        let request = self.http.get(&self.url).query(&[
            ("origins", origins.as_str()),
            ("destinations", destination),
            ("units", self.units.as_str()),
            ("key", self.api_key.as_str()),
        ]);

        let response: MatrixResponse = fetch_json(SERVICE, request).await?;
        response.into_distance(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> MatrixResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_distance_text() {
        assert_eq!(parse_distance_text("9.8 mi"), Some(9.8));
        assert_eq!(parse_distance_text("1,204 km"), Some(1204.0));
        assert_eq!(parse_distance_text("12 mi"), Some(12.0));
        assert_eq!(parse_distance_text(""), None);
        assert_eq!(parse_distance_text("far away"), None);
    }

    #[test]
    fn test_ok_element_yields_distance() {
        let miles = response(json!({
            "status": "OK",
            "rows": [{ "elements": [{ "status": "OK", "distance": { "text": "9.8 mi", "value": 15771 } }] }]
        }))
        .into_distance("1400 Curtis Street, Denver, CO 80202")
        .unwrap();
        assert_eq!(miles, 9.8);
    }

    #[test]
    fn test_element_failure_is_no_route() {
        let err = response(json!({
            "status": "OK",
            "rows": [{ "elements": [{ "status": "NOT_FOUND" }] }]
        }))
        .into_distance("nowhere")
        .unwrap_err();
        assert!(matches!(err, UpstreamError::NoRoute(dest) if dest == "nowhere"));
    }

    #[test]
    fn test_top_level_failure_is_no_route() {
        let err = response(json!({ "status": "INVALID_REQUEST", "rows": [] }))
            .into_distance("nowhere")
            .unwrap_err();
        assert!(matches!(err, UpstreamError::NoRoute(_)));
    }
}
