//! Reference data endpoints

use crate::models::CategoryInfluence;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub dataset_size: usize,
    pub influence: CategoryInfluence,
    pub loaded_at: String,
}

/// GET /api/influence
///
/// Current category anchors, keyed by category name.
pub async fn get_influence(State(state): State<AppState>) -> Json<CategoryInfluence> {
    let snapshot = state.engine.knowledge().snapshot().await;
    Json(snapshot.influence)
}

/// POST /api/dataset/reload
///
/// Re-reads the dataset and taxonomy, recalibrates and swaps the snapshot.
///
/// **Errors:**
/// - 409 Conflict: the service runs without on-disk sources
/// - 500 Internal Server Error: files missing or unparseable (the previous
///   snapshot stays active)
pub async fn reload_dataset(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let knowledge = state.engine.knowledge();
    if knowledge.sources().is_none() {
        return Err(ApiError::Conflict(
            "Reference data was not loaded from disk; nothing to reload".to_string(),
        ));
    }

    let snapshot = knowledge.reload().await.map_err(|e| {
        warn!("Reference data reload failed: {}", e);
        ApiError::Common(e)
    })?;
    info!("Reference data reloaded via API");

    Ok(Json(ReloadResponse {
        dataset_size: snapshot.dataset.len(),
        influence: snapshot.influence,
        loaded_at: snapshot.loaded_at.to_rfc3339(),
    }))
}

pub fn dataset_routes() -> Router<AppState> {
    Router::new()
        .route("/api/influence", get(get_influence))
        .route("/api/dataset/reload", post(reload_dataset))
}
