//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the upstream clients and services from config
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CORS,
//!   security headers, rate limit, auth)
//! - Serve until the shutdown channel fires
//! - Sweep expired sessions and idle rate-limit buckets in the background

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::tokens::TokenStore;
use crate::auth::users::{StoreError, UserStore};
use crate::auth::{require_auth, Accounts, SqliteUserStore};
use crate::concerts::ConcertService;
use crate::config::RhythmsConfig;
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::not_found;
use crate::observability::metrics;
use crate::security::headers::{cors_layer, with_security_headers};
use crate::security::{rate_limit_middleware, RateLimiter};
use crate::upstream::{build_http_client, GoogleDistance, GoogleGeocoder, JamBaseClient};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Errors building the server from config.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("User store error: {0}")]
    Users(#[from] StoreError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub concerts: Arc<ConcertService>,
    pub accounts: Accounts,
}

/// HTTP server for the concert API.
pub struct HttpServer {
    router: Router,
    config: RhythmsConfig,
    tokens: TokenStore,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a server talking to the configured upstream services and
    /// user database.
    pub fn new(config: RhythmsConfig) -> Result<Self, ServerError> {
        let http = build_http_client(&config.timeouts)?;
        let concerts = ConcertService::new(
            Arc::new(GoogleGeocoder::new(http.clone(), &config.upstream)),
            Arc::new(JamBaseClient::new(http.clone(), &config.upstream)),
            Arc::new(GoogleDistance::new(http, &config.upstream)),
            config.upstream.default_geo_radius,
        );
        let users = SqliteUserStore::open(&config.auth.users_db)?;
        Ok(Self::with_services(config, concerts, Arc::new(users)))
    }

    /// Create a server around already-built services.
    pub fn with_services(config: RhythmsConfig, concerts: ConcertService, users: Arc<dyn UserStore>) -> Self {
        let tokens = TokenStore::new(Duration::from_secs(config.auth.token_ttl_secs));
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let state = AppState {
            concerts: Arc::new(concerts),
            accounts: Accounts::new(users, tokens.clone(), &config.auth),
        };

        let router = Self::build_router(&config, state, tokens.clone(), limiter.clone());
        Self {
            router,
            config,
            tokens,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RhythmsConfig, state: AppState, tokens: TokenStore, limiter: Arc<RateLimiter>) -> Router {
        let concerts = Router::new()
            .route("/concerts", get(handlers::list_concerts))
            .route("/concerts/random", get(handlers::random_concert))
            .route("/concerts/{id}", get(handlers::concert_detail))
            .route_layer(middleware::from_fn_with_state(tokens, require_auth))
            .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));

        let router = Router::new()
            .route("/auth/register", post(handlers::register))
            .route("/auth/login", post(handlers::login))
            .route("/health", get(handlers::health))
            .merge(concerts)
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.security))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid));

        with_security_headers(router, &config.security)
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = spawn_sweeper(self.tokens.clone(), self.limiter.clone(), shutdown.resubscribe());

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        sweeper.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RhythmsConfig {
        &self.config
    }
}

/// Periodically drop expired sessions and idle rate-limit buckets.
fn spawn_sweeper(tokens: TokenStore, limiter: Arc<RateLimiter>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sessions = tokens.purge_expired();
                    let clients = limiter.purge_idle();
                    tracing::debug!(
                        expired_sessions = sessions,
                        idle_clients = clients,
                        active_sessions = tokens.active(),
                        tracked_clients = limiter.tracked_clients(),
                        "Swept idle state"
                    );
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), started);
    response
}
