use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookforge_core::book::{Book, BookFilter, BookSummary, UpdateBook, Visibility};
use bookforge_service::{BookService, ForgeRequest, ReadRequest, ReaderView};
use serde::Deserialize;

use super::{bad_request, to_error, ApiError, AppState};

/// Library, forging and reading. Behind the API key.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books).post(forge_book))
        .route(
            "/api/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/{id}/pages", get(read_page))
        .route(
            "/api/books/{id}/cover",
            axum::routing::post(regenerate_cover),
        )
}

/// Cover images are served without a key so gallery pages can embed them.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/books/{id}/cover", get(get_cover))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    visibility: Option<String>,
    author: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListQuery {
    fn into_filter(self) -> Result<BookFilter, ApiError> {
        let visibility = match self.visibility.as_deref() {
            None | Some("") | Some("all") => None,
            Some(v) => Some(
                Visibility::parse_str(v)
                    .ok_or_else(|| bad_request(format!("unknown visibility: {v}")))?,
            ),
        };
        Ok(BookFilter {
            visibility,
            author: self.author.filter(|a| !a.is_empty()),
            limit: self.limit,
            offset: self.offset,
        })
    }
}

async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BookSummary>>, ApiError> {
    let filter = query.into_filter()?;
    state
        .service
        .list_books(&filter)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn forge_book(
    State(state): State<AppState>,
    Json(request): Json<ForgeRequest>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    state
        .service
        .forge_book(&request)
        .await
        .map(|book| (StatusCode::CREATED, Json(book)))
        .map_err(to_error)
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    state.service.get_book(&id).await.map(Json).map_err(to_error)
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UpdateBook>,
) -> Result<Json<Book>, ApiError> {
    state
        .service
        .update_book(&id, &update)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_book(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<i64>,
    words_per_page: Option<u32>,
    reader: Option<String>,
}

async fn read_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ReaderView>, ApiError> {
    let request = ReadRequest {
        page: query.page.unwrap_or(0),
        words_per_page: query.words_per_page,
        reader_id: query.reader,
    };
    state
        .service
        .read_page(&id, &request)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn get_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let cover = state.service.cover(&id).await.map_err(to_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, cover.mime_type),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        cover.bytes,
    )
        .into_response())
}

async fn regenerate_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    state
        .service
        .regenerate_cover(&id)
        .await
        .map(Json)
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_helpers::{test_router, test_router_with_auth};

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn forge(app: &axum::Router, visibility: &str) -> Value {
        let (status, body) = send(
            app,
            post_json(
                "/api/books",
                json!({ "idea": "a lighthouse that keeps time", "visibility": visibility }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json_body(&body)
    }

    #[tokio::test]
    async fn forge_then_read_first_page() {
        let app = test_router().await;
        let book = forge(&app, "private").await;
        let id = book["id"].as_str().unwrap();

        let (status, body) = send(&app, get(&format!("/api/books/{id}/pages?page=-3"))).await;
        assert_eq!(status, StatusCode::OK);
        let view = json_body(&body);
        assert_eq!(view["page"]["index"], 0);
        assert_eq!(view["page"]["has_previous"], false);
        assert_eq!(view["title"], book["title"]);
    }

    #[tokio::test]
    async fn blank_idea_is_bad_request() {
        let app = test_router().await;
        let (status, body) = send(&app, post_json("/api/books", json!({ "idea": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].as_str().unwrap().contains("idea"));
    }

    #[tokio::test]
    async fn unknown_book_is_not_found() {
        let app = test_router().await;
        let (status, body) = send(&app, get("/api/books/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json_body(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_visibility_filter_is_bad_request() {
        let app = test_router().await;
        let (status, _) = send(&app, get("/api/books?visibility=secret")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cover_is_served_with_content_type() {
        let app = test_router().await;
        let book = forge(&app, "public").await;
        let id = book["id"].as_str().unwrap();

        let resp = app
            .clone()
            .oneshot(get(&format!("/api/books/{id}/cover")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn gallery_and_cover_are_public_but_library_is_not() {
        let (app, key) = test_router_with_auth().await;

        let forge_request = Request::builder()
            .method("POST")
            .uri("/api/books")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {key}"))
            .body(Body::from(json!({ "idea": "x", "visibility": "public" }).to_string()))
            .unwrap();
        let (status, body) = send(&app, forge_request).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json_body(&body)["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get("/api/gallery")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["total"], 1);

        let (status, _) = send(&app, get(&format!("/api/books/{id}/cover"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, get("/api/books")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, post_json(&format!("/api/books/{id}/cover"), json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
