//! Route handlers.
//!
//! Handlers only translate between HTTP and the services; extraction
//! failures are rendered as 400 `ApiError`s.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Extension, Json,
};

use crate::auth::users::UserClaims;
use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::{ApiError, ApiResult};
use crate::http::request::{ConcertDetailQuery, ConcertQuery, RandomConcertQuery};
use crate::http::response::{
    created, ConcertResponse, ConcertsResponse, HealthResponse, RandomConcertResponse, TokenResponse,
};
use crate::http::server::AppState;
use crate::observability::metrics;

fn query_error(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

fn json_error(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body.map_err(json_error)?;
    let token = state.accounts.register(request).await?;
    Ok(created(token))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(request) = body.map_err(json_error)?;
    let token = state.accounts.login(request).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn list_concerts(
    State(state): State<AppState>,
    Extension(user): Extension<UserClaims>,
    query: Result<Query<ConcertQuery>, QueryRejection>,
) -> ApiResult<Json<ConcertsResponse>> {
    let Query(query) = query.map_err(query_error)?;
    let params = query.into_params()?;

    let concerts = state.concerts.search(&params).await?;
    tracing::info!(user_id = user.id, zip_code = %params.zip_code, count = concerts.len(), "Listed concerts");
    metrics::record_concerts_returned(concerts.len());
    Ok(Json(ConcertsResponse { concerts }))
}

pub async fn random_concert(
    State(state): State<AppState>,
    Extension(user): Extension<UserClaims>,
    query: Result<Query<RandomConcertQuery>, QueryRejection>,
) -> ApiResult<Json<RandomConcertResponse>> {
    let Query(query) = query.map_err(query_error)?;
    let (params, max_price) = query.into_params()?;

    let random_concert = state.concerts.random(&params, max_price).await?;
    tracing::info!(
        user_id = user.id,
        zip_code = %params.zip_code,
        found = random_concert.is_some(),
        "Picked random concert"
    );
    Ok(Json(RandomConcertResponse { random_concert }))
}

pub async fn concert_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserClaims>,
    Path(id): Path<String>,
    query: Result<Query<ConcertDetailQuery>, QueryRejection>,
) -> ApiResult<Json<ConcertResponse>> {
    let Query(query) = query.map_err(query_error)?;
    let concert = state.concerts.detail(&id, query.zip_code()?).await?;
    tracing::info!(user_id = user.id, concert_id = %concert.id, "Fetched concert");
    Ok(Json(ConcertResponse { concert }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
