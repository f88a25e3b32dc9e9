//! Per-client rate limiting middleware.
//!
//! Each client IP owns a token bucket holding `max_requests` tokens that
//! refills at `max_requests / window_secs` per second.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::observability::metrics;

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn is_full(&self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }
}

/// Shared limiter state.
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    capacity: f64,
    refill_rate: f64,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_secs.max(1));
        Self::with_window(config.enabled, config.max_requests, window)
    }

    pub fn with_window(enabled: bool, max_requests: u32, window: Duration) -> Self {
        let capacity = f64::from(max_requests.max(1));
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_rate: capacity / window.as_secs_f64().max(f64::EPSILON),
            enabled,
        }
    }

    /// Take one token for `key`. Returns false when the client is over its allowance.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity, now));
        bucket.try_acquire(self.capacity, self.refill_rate, now)
    }

    /// Forget clients whose bucket has refilled completely.
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| !bucket.is_full(self.capacity, self.refill_rate, now));
        before - self.buckets.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Client key for a request: peer IP when known.
fn client_key(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reject requests over the per-client allowance with 429.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if limiter.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited("concerts");
        ApiError::TooManyRequests.into_response()
    }
}
