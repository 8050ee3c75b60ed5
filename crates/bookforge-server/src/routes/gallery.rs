use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use bookforge_service::{BookService, Gallery};
use serde::Deserialize;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/gallery", get(gallery))
}

#[derive(Debug, Deserialize)]
struct GalleryQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Public books, newest first. Readable without an API key.
async fn gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Gallery>, ApiError> {
    state
        .service
        .gallery(query.limit, query.offset)
        .await
        .map(Json)
        .map_err(to_error)
}
