//! The light service: an in-memory light behind the two REST endpoints.
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Timelike, Utc};
use lightwatch_common::status::SystemStatus;
use tokio::sync::Mutex;
use tracing::info;

struct LightState {
    light_on: bool,
    brightness: u32,
    last_modified: DateTime<Utc>,
}

type AppState = Arc<Mutex<LightState>>;

/// Build the service router.
#[must_use]
pub fn router() -> Router {
    let state: AppState = Arc::new(Mutex::new(LightState {
        light_on: false,
        brightness: 0,
        last_modified: Utc::now(),
    }));

    Router::new()
        .route("/api/system/status", get(get_status))
        .route("/api/system/toggle", post(toggle))
        .route("/health", get(health))
        .with_state(state)
}

async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let state = state.lock().await;
    Json(SystemStatus {
        light_on: state.light_on,
        brightness: state.brightness,
    })
}

// No real sensor; derive a plausible reading from the clock.
fn simulated_brightness(now: &DateTime<Utc>) -> u32 {
    300 + now.second() * 5
}

async fn toggle(State(state): State<AppState>) -> impl IntoResponse {
    let mut state = state.lock().await;

    state.light_on = !state.light_on;
    state.last_modified = Utc::now();
    state.brightness = if state.light_on {
        simulated_brightness(&state.last_modified)
    } else {
        0
    };

    info!("light toggled: on={}", state.light_on);

    let body = serde_json::json!({
        "operation": "state_update",
        "success": true,
        "newState": state.light_on,
        "timestamp": state.last_modified.to_rfc3339(),
    });

    (StatusCode::ACCEPTED, Json(body))
}

async fn health() -> &'static str {
    "System operational"
}

/// Bind and serve until the process ends.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server dies.
pub async fn run(addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
