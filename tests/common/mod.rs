//! Shared utilities for integration tests: mock upstream services and a
//! server harness bound to ephemeral ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Local};
use random_rhythms::{HttpServer, RhythmsConfig, Shutdown};
use rhythms_sdk::{RhythmsClient, Signup};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const JAMBASE_KEY: &str = "test-jambase-key";
pub const GOOGLE_KEY: &str = "test-google-key";
pub const SIGNUP_CODE: &str = "test-signup-code";

pub const KNOWN_EVENT: &str = "jambase:11070750";
pub const KNOWN_ZIP: &str = "80202";
pub const UNKNOWN_ZIP: &str = "00000";

/// Per-service call counters.
#[derive(Default)]
pub struct Calls {
    pub jambase: AtomicUsize,
    pub geocode: AtomicUsize,
    pub distance: AtomicUsize,
}

impl Calls {
    pub fn jambase(&self) -> usize {
        self.jambase.load(Ordering::SeqCst)
    }

    pub fn geocode(&self) -> usize {
        self.geocode.load(Ordering::SeqCst)
    }
}

pub struct MockUpstreams {
    pub addr: SocketAddr,
    pub calls: Arc<Calls>,
}

fn event_json(id: &str, headliner: &str, price: Option<&str>) -> Value {
    let offers = match price {
        Some(price) => json!([{
            "url": "https://tickets.example/ben-rector",
            "priceSpecification": { "price": price }
        }]),
        None => json!([]),
    };

    json!({
        "identifier": id,
        "eventStatus": "scheduled",
        "startDate": "2030-02-01T19:30:00",
        "location": {
            "name": "Boettcher Concert Hall",
            "address": {
                "streetAddress": "1400 Curtis Street",
                "addressLocality": "Denver",
                "postalCode": "80202",
                "addressRegion": { "alternateName": "CO" }
            }
        },
        "offers": offers,
        "performer": [
            { "name": headliner, "image": "https://img.example/headliner.png", "genre": ["folk", "pop"] },
            { "name": "Cody Fry" }
        ]
    })
}

async fn events(State(calls): State<Arc<Calls>>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    calls.jambase.fetch_add(1, Ordering::SeqCst);
    if query.get("apikey").map(String::as_str) != Some(JAMBASE_KEY) {
        return Json(json!({ "success": false, "errors": [{ "code": "api_key_invalid", "message": "bad key" }] }));
    }
    Json(json!({
        "success": true,
        "events": [
            event_json(KNOWN_EVENT, "Ben Rector", Some("22.00")),
            event_json("jambase:11070751", "Lake Street Dive", None),
        ]
    }))
}

async fn event(State(calls): State<Arc<Calls>>, Path(id): Path<String>) -> Json<Value> {
    calls.jambase.fetch_add(1, Ordering::SeqCst);
    if id == KNOWN_EVENT {
        return Json(json!({ "success": true, "event": event_json(KNOWN_EVENT, "Ben Rector", Some("22.00")) }));
    }
    let code = if id.starts_with("jambase:") {
        "identifier_invalid"
    } else {
        "source_invalid"
    };
    Json(json!({ "success": false, "errors": [{ "code": code, "message": format!("no event {}", id) }] }))
}

async fn geocode(State(calls): State<Arc<Calls>>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    calls.geocode.fetch_add(1, Ordering::SeqCst);
    let components = query.get("components").cloned().unwrap_or_default();
    if components == format!("postal_code:{}|country:US", KNOWN_ZIP) && query.get("key").map(String::as_str) == Some(GOOGLE_KEY) {
        Json(json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 39.7392, "lng": -104.9903 } } }]
        }))
    } else {
        Json(json!({ "status": "ZERO_RESULTS", "results": [] }))
    }
}

async fn distance(State(calls): State<Arc<Calls>>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    calls.distance.fetch_add(1, Ordering::SeqCst);
    let destination = query.get("destinations").cloned().unwrap_or_default();
    if destination == "1400 Curtis Street, Denver, CO 80202" {
        Json(json!({
            "status": "OK",
            "rows": [{ "elements": [{ "status": "OK", "distance": { "text": "9.8 mi", "value": 15771 } }] }]
        }))
    } else {
        Json(json!({ "status": "OK", "rows": [{ "elements": [{ "status": "NOT_FOUND" }] }] }))
    }
}

/// Start JamBase and Google stand-ins on one ephemeral port.
pub async fn start_mock_upstreams() -> MockUpstreams {
    let calls = Arc::new(Calls::default());
    let app = Router::new()
        .route("/jb-api/v1/events", get(events))
        .route("/jb-api/v1/events/id/{id}", get(event))
        .route("/maps/api/geocode/json", get(geocode))
        .route("/maps/api/distancematrix/json", get(distance))
        .with_state(calls.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstreams { addr, calls }
}

/// Config pointing every upstream at the mocks.
pub fn test_config(upstreams: &MockUpstreams) -> RhythmsConfig {
    let mut config = RhythmsConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.auth.signup_code = SIGNUP_CODE.into();
    config.auth.bcrypt_cost = 4;
    config.auth.users_db = ":memory:".into();
    config.upstream.jambase_base_url = format!("http://{}/jb-api/v1", upstreams.addr);
    config.upstream.jambase_api_key = JAMBASE_KEY.into();
    config.upstream.geocode_url = format!("http://{}/maps/api/geocode/json", upstreams.addr);
    config.upstream.distance_url = format!("http://{}/maps/api/distancematrix/json", upstreams.addr);
    config.upstream.google_api_key = GOOGLE_KEY.into();
    config
}

pub struct TestServer {
    pub url: String,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

pub async fn start_server(config: RhythmsConfig) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        url: format!("http://{}", addr),
        shutdown,
        handle,
    }
}

/// Mocks plus a server wired to them.
pub async fn start_stack() -> (MockUpstreams, TestServer) {
    let upstreams = start_mock_upstreams().await;
    let server = start_server(test_config(&upstreams)).await;
    (upstreams, server)
}

pub fn signup(email: &str) -> Signup {
    Signup {
        email: email.to_string(),
        password: "password".to_string(),
        name: "Test Fan".to_string(),
        signup_code: SIGNUP_CODE.to_string(),
    }
}

/// A client that has registered and holds a token.
pub async fn registered_client(url: &str) -> RhythmsClient {
    let mut client = RhythmsClient::new(url);
    client.register(&signup("fan@test.com")).await.unwrap();
    client
}

/// `YYYY-MM-DD` for today plus `days`.
pub fn date_from_today(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
