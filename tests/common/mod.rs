//! In-process SignalFx API fake backing the acceptance tests.
//!
//! Stores chart bodies exactly as the provider sent them, so tests can
//! assert the wire format (camelCase keys, millisecond timestamps) as
//! well as the state that comes back.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Org token the fake accepts in the `X-SF-TOKEN` header.
pub const TEST_TOKEN: &str = "test-org-token";

/// Session token handed out for [`TEST_EMAIL`] / [`TEST_PASSWORD`].
pub const TEST_SESSION_TOKEN: &str = "test-session-token";

pub const TEST_EMAIL: &str = "provider@example.com";
pub const TEST_PASSWORD: &str = "hunter2";

/// Shared state of the fake API. Clone freely; all clones see the same
/// chart store.
#[derive(Clone, Default)]
pub struct FakeSignalFx {
    charts: Arc<Mutex<HashMap<String, Value>>>,
    next_id: Arc<Mutex<u64>>,
}

impl FakeSignalFx {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw wire body stored for a chart, if it exists.
    pub fn chart(&self, id: &str) -> Option<Value> {
        self.charts.lock().unwrap().get(id).cloned()
    }

    pub fn chart_count(&self) -> usize {
        self.charts.lock().unwrap().len()
    }

    /// Seed a chart as if it had been created outside the provider.
    pub fn insert_chart(&self, id: &str, mut body: Value) {
        body["id"] = json!(id);
        self.charts.lock().unwrap().insert(id.to_string(), body);
    }

    fn assign_id(&self) -> String {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        format!("chart-{:04}", *next_id)
    }
}

/// Bind the fake API on an ephemeral port and return its base URL.
pub async fn spawn_api(fake: FakeSignalFx) -> String {
    let router = Router::new()
        .route("/v2/session", post(create_session))
        .route("/v2/chart", post(create_chart))
        .route(
            "/v2/chart/{id}",
            get(get_chart).put(update_chart).delete(delete_chart),
        )
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    matches!(
        headers.get("X-SF-TOKEN").and_then(|v| v.to_str().ok()),
        Some(TEST_TOKEN) | Some(TEST_SESSION_TOKEN)
    )
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized"})),
    )
}

async fn create_session(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({"accessToken": TEST_SESSION_TOKEN})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid username or password"})),
        )
    }
}

async fn create_chart(
    State(fake): State<FakeSignalFx>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = fake.assign_id();
    body["id"] = json!(id);
    fake.charts.lock().unwrap().insert(id, body.clone());
    (StatusCode::OK, Json(body))
}

async fn get_chart(
    State(fake): State<FakeSignalFx>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    match fake.chart(&id) {
        Some(chart) => (StatusCode::OK, Json(chart)),
        None => not_found(&id),
    }
}

async fn update_chart(
    State(fake): State<FakeSignalFx>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut charts = fake.charts.lock().unwrap();
    if !charts.contains_key(&id) {
        return not_found(&id);
    }
    body["id"] = json!(id);
    charts.insert(id, body.clone());
    (StatusCode::OK, Json(body))
}

async fn delete_chart(
    State(fake): State<FakeSignalFx>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    if fake.charts.lock().unwrap().remove(&id).is_some() {
        (StatusCode::OK, Json(json!({})))
    } else {
        not_found(&id)
    }
}

fn not_found(id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": format!("Chart {} not found", id)})),
    )
}
