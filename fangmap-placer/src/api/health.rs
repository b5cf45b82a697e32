//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok", or "degraded" when the dataset is empty)
    pub status: String,
    /// Module name ("fangmap-placer")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Artists in the current reference dataset
    pub dataset_size: usize,
    /// Tag lookups that matched no category since the snapshot was built
    pub unmatched_tag_lookups: u64,
    /// When the current snapshot was built
    pub dataset_loaded_at: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    let snapshot = state.engine.knowledge().snapshot().await;
    let status = if snapshot.dataset.is_empty() {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        module: "fangmap-placer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        dataset_size: snapshot.dataset.len(),
        unmatched_tag_lookups: snapshot.categorizer.unmatched_lookups(),
        dataset_loaded_at: snapshot.loaded_at.to_rfc3339(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
