use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use bookforge_core::preferences::{ReaderPreferences, UpdatePreferences};
use bookforge_service::BookService;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/readers/{reader_id}/preferences",
        get(get_preferences).put(update_preferences),
    )
}

async fn get_preferences(
    State(state): State<AppState>,
    Path(reader_id): Path<String>,
) -> Result<Json<ReaderPreferences>, ApiError> {
    state
        .service
        .get_preferences(&reader_id)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn update_preferences(
    State(state): State<AppState>,
    Path(reader_id): Path<String>,
    Json(update): Json<UpdatePreferences>,
) -> Result<Json<ReaderPreferences>, ApiError> {
    state
        .service
        .update_preferences(&reader_id, &update)
        .await
        .map(Json)
        .map_err(to_error)
}
