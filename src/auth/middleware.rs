//! Bearer token middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::tokens::TokenStore;
use crate::error::ApiError;

/// Pull the token out of an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a live bearer token; attach `UserClaims` otherwise.
pub async fn require_auth(
    State(tokens): State<TokenStore>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let claims = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .and_then(|token| tokens.verify(token));

    match claims {
        Some(claims) => {
            tracing::debug!(user_id = claims.id, "Authenticated request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        None => ApiError::unauthorized("Unauthorized").into_response(),
    }
}
