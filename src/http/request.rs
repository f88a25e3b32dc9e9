//! Request identification and query validation.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every request
//! - Deserialize `/concerts*` query strings
//! - Turn raw query values into validated search parameters
//!
//! # Design Decisions
//! - Request ID added as early as possible so the trace span carries it
//! - Any malformed query value is a 400 with a message naming the field

use axum::http::{HeaderName, Request};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::concerts::dates::parse_date;
use crate::concerts::SearchParams;
use crate::error::{ApiError, ApiResult};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub const MAX_GEO_RADIUS: u32 = 500;

/// UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Request ID of a request, or `-` when absent.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Query for `GET /concerts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcertQuery {
    pub date_from: String,
    pub date_to: String,
    pub zip_code: String,
    pub geo_radius: Option<u32>,
}

/// Query for `GET /concerts/random`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomConcertQuery {
    pub date_from: String,
    pub date_to: String,
    pub zip_code: String,
    pub geo_radius: Option<u32>,
    pub price: Option<f64>,
}

/// Query for `GET /concerts/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcertDetailQuery {
    pub zip_code: Option<String>,
}

impl ConcertQuery {
    pub fn into_params(self) -> ApiResult<SearchParams> {
        search_params(&self.date_from, &self.date_to, self.zip_code, self.geo_radius)
    }
}

impl RandomConcertQuery {
    /// Search parameters plus the optional price ceiling.
    pub fn into_params(self) -> ApiResult<(SearchParams, Option<f64>)> {
        let max_price = self.price.map(validate_price).transpose()?;
        let params = search_params(&self.date_from, &self.date_to, self.zip_code, self.geo_radius)?;
        Ok((params, max_price))
    }
}

impl ConcertDetailQuery {
    /// The validated zip code, if one was supplied.
    pub fn zip_code(&self) -> ApiResult<Option<&str>> {
        match self.zip_code.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(zip) => validate_zip(zip).map(Some),
        }
    }
}

fn search_params(
    date_from: &str,
    date_to: &str,
    zip_code: String,
    geo_radius: Option<u32>,
) -> ApiResult<SearchParams> {
    let (Some(date_from), Some(date_to)) = (parse_date(date_from), parse_date(date_to)) else {
        return Err(ApiError::bad_request("invalid dates"));
    };
    let zip_code = validate_zip(zip_code.trim())?.to_string();
    let geo_radius = geo_radius.map(validate_radius).transpose()?;

    Ok(SearchParams {
        date_from,
        date_to,
        zip_code,
        geo_radius,
    })
}

/// Five ASCII digits.
pub fn validate_zip(zip: &str) -> ApiResult<&str> {
    if zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zip)
    } else {
        Err(ApiError::bad_request("Invalid zip code"))
    }
}

fn validate_radius(radius: u32) -> ApiResult<u32> {
    if (1..=MAX_GEO_RADIUS).contains(&radius) {
        Ok(radius)
    } else {
        Err(ApiError::bad_request(format!(
            "geoRadius must be between 1 and {}",
            MAX_GEO_RADIUS
        )))
    }
}

fn validate_price(price: f64) -> ApiResult<f64> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ApiError::bad_request("price must be a non-negative number"))
    }
}
