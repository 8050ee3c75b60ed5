pub mod books;
pub mod gallery;
pub mod health;
pub mod readers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{middleware, Json, Router};
use bookforge_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};

pub struct InnerAppState {
    pub service: LocalService,
    pub auth: Option<Arc<AuthConfig>>,
}

pub type AppState = Arc<InnerAppState>;

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::routes())
        .merge(gallery::routes())
        .merge(books::public_routes());

    let protected = Router::new()
        .merge(books::routes())
        .merge(readers::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a service failure onto a status code and a `{"error": msg}` body.
pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Generation(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, Json(json!({ "error": e.to_string() })))
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    to_error(ServiceError::InvalidInput(msg.into()))
}
