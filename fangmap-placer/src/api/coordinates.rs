//! Coordinate inference endpoints
//!
//! `GET /api/coordinates?artist=NAME` places one artist.
//! `POST /api/coordinates` places a list of artists and also returns their
//! average, which is where a listener with that library lands on the map.

use crate::models::{Coordinate, Placement};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    #[serde(default)]
    pub artist: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub artists: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// One placement per requested artist, in request order
    pub placements: Vec<Placement>,
    /// Mean of all placements, (0, 0) for an empty request
    pub average: Coordinate,
}

/// GET /api/coordinates?artist=NAME
pub async fn get_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> ApiResult<Json<Placement>> {
    let artist = query.artist.trim();
    if artist.is_empty() {
        return Err(ApiError::BadRequest("Artist name is required".to_string()));
    }

    Ok(Json(state.engine.place(artist).await))
}

/// POST /api/coordinates
///
/// **Request:** `{"artists": ["Bauhaus", "The Cure"]}`
/// **Response:** `{"placements": [...], "average": {"x": .., "y": ..}}`
///
/// Blank names are rejected rather than silently dropped so placements stay
/// aligned with the request.
pub async fn post_coordinates(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<Json<BatchResponse>> {
    if let Some(position) = request.artists.iter().position(|a| a.trim().is_empty()) {
        return Err(ApiError::BadRequest(format!(
            "Artist name at index {} is empty",
            position
        )));
    }
    if request.artists.len() > state.max_batch_size {
        return Err(ApiError::BadRequest(format!(
            "At most {} artists per request",
            state.max_batch_size
        )));
    }

    let artists: Vec<String> = request.artists.iter().map(|a| a.trim().to_string()).collect();
    let placements = state.engine.infer_many(&artists, state.max_concurrent).await;

    let coordinates: Vec<Coordinate> = placements.iter().map(|p| p.coordinate).collect();
    let average = Coordinate::average(&coordinates);

    Ok(Json(BatchResponse {
        placements,
        average,
    }))
}

pub fn coordinate_routes() -> Router<AppState> {
    Router::new().route("/api/coordinates", get(get_coordinates).post(post_coordinates))
}
