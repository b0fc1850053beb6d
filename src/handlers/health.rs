//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! service statistics and the state of the endpoint store.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    state.stats.record_http_request();

    // A poisoned store lock means writes can no longer be served
    let (status, message, endpoint_count) = match state.store.len() {
        Ok(count) => (StatusCode::OK, "OK", count),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable", 0),
    };

    let uptime_seconds = state.stats.get_uptime_seconds();
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = state.stats.render_table(endpoint_count);
    let file = state.store.file().path().display().to_string();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\nConfig file: {file}\n\n{table}"),
    )
}
