//! Response bodies for the public API.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::concerts::Concert;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcertsResponse {
    pub concerts: Vec<Concert>,
}

/// `randomConcert` is `null` when nothing matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomConcertResponse {
    pub random_concert: Option<Concert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcertResponse {
    pub concert: Concert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// 201 with a token body.
pub fn created(token: String) -> Response {
    (StatusCode::CREATED, Json(TokenResponse { token })).into_response()
}

/// JSON 404 for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "No route matched");
    ApiError::not_found("Not Found")
}
