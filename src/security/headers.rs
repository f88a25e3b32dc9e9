//! Security and CORS response headers.
//!
//! # Responsibilities
//! - Add hardening headers to every response
//! - Build the CORS policy for browser clients
//!
//! # Design Decisions
//! - Headers are only set when the handler did not set them already
//! - An empty origin list allows any origin

use axum::http::{
    header::{self, HeaderName, HeaderValue},
    Method,
};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

/// Headers added to every response when enabled.
pub const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::STRICT_TRANSPORT_SECURITY, "max-age=31536000; includeSubDomains"),
];

/// Wrap a router with the configured security headers.
pub fn with_security_headers(router: Router, config: &SecurityConfig) -> Router {
    if !config.enable_headers {
        return router;
    }
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        })
}

/// CORS policy from config.
pub fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    async fn get_root(router: Router) -> axum::response::Response {
        router
            .oneshot(
                Request::get("/")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let router = Router::new().route("/", get(|| async { "ok" }));
        let response = get_root(with_security_headers(router, &SecurityConfig::default())).await;

        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_security_headers_can_be_disabled() {
        let config = SecurityConfig {
            enable_headers: false,
            ..Default::default()
        };
        let router = Router::new().route("/", get(|| async { "ok" }));
        let response = get_root(with_security_headers(router, &config)).await;
        assert!(response.headers().get(header::X_FRAME_OPTIONS).is_none());
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&SecurityConfig::default()));
        let response = get_root(router).await;
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_cors_restricts_to_listed_origins() {
        let config = SecurityConfig {
            cors_allowed_origins: vec!["https://rhythms.example".into()],
            ..Default::default()
        };
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(&config));
        let response = get_root(router).await;
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
