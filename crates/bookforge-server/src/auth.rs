use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde_json::json;
use sha2::{Digest, Sha256};

use bookforge_db::Database;

use crate::routes::AppState;

pub const API_KEY_PREFIX: &str = "bf_";
const API_KEY_RANDOM_LEN: usize = 43;
const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Accepted credentials: the `BOOKFORGE_API_KEY` hash and any key in the database.
pub struct AuthConfig {
    pub env_key_hash: Option<String>,
    pub db: Arc<dyn Database>,
}

/// Hex-encoded SHA-256 digest.
pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

/// `bf_` followed by 43 random base62 characters.
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let random_part: String = (0..API_KEY_RANDOM_LEN)
        .map(|_| BASE62[rng.gen_range(0..BASE62.len())] as char)
        .collect();
    format!("{API_KEY_PREFIX}{random_part}")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid API key" })),
    )
        .into_response()
}

/// Require `Authorization: Bearer <key>` on protected routes. Open access
/// when the state carries no `AuthConfig`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth) = &state.auth else {
        return next.run(request).await;
    };

    let Some(token) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return unauthorized();
    };

    let token_hash = sha256_hex(token.trim());

    if let Some(ref env_hash) = auth.env_key_hash {
        if constant_time_eq(&token_hash, env_hash) {
            return next.run(request).await;
        }
    }

    match auth.db.find_api_key_by_hash(&token_hash).await {
        Ok(Some(api_key)) => {
            let db = auth.db.clone();
            tokio::spawn(async move {
                if let Err(e) = db.touch_api_key(&api_key.id).await {
                    tracing::debug!(error = %e, "failed to record API key use");
                }
            });
            next.run(request).await
        }
        Ok(None) => unauthorized(),
        Err(e) => {
            tracing::error!(error = %e, "API key lookup failed");
            unauthorized()
        }
    }
}

/// Compare equal-length hex digests without short-circuiting.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// `None` (open access) when there is neither an env key nor any DB key.
pub async fn build_auth_config(
    db: Arc<dyn Database>,
    env_key: Option<&str>,
) -> Option<Arc<AuthConfig>> {
    let env_key_hash = env_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(sha256_hex);

    let has_db_keys = match db.has_api_keys().await {
        Ok(has) => has,
        Err(e) => {
            tracing::warn!(error = %e, "could not check for stored API keys");
            false
        }
    };

    if env_key_hash.is_none() && !has_db_keys {
        return None;
    }
    Some(Arc::new(AuthConfig { env_key_hash, db }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::test_helpers::{test_router, test_router_with_auth};

    fn memory_db() -> Arc<dyn Database> {
        Arc::new(bookforge_db::SqliteDatabase::open_in_memory().unwrap())
    }

    #[test]
    fn sha256_hex_known_vectors() {
        assert_eq!(
            sha256_hex("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn generated_keys_are_prefixed_base62() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX), "{key}");
        assert_eq!(key.len(), API_KEY_PREFIX.len() + API_KEY_RANDOM_LEN);
        assert!(key[API_KEY_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn constant_time_eq_cases() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("short", "longer"));
        assert!(constant_time_eq("", ""));
    }

    #[tokio::test]
    async fn no_keys_means_open_access() {
        assert!(build_auth_config(memory_db(), None).await.is_none());
        assert!(build_auth_config(memory_db(), Some("  ")).await.is_none());
    }

    #[tokio::test]
    async fn env_or_db_key_enables_auth() {
        let config = build_auth_config(memory_db(), Some("secret")).await.unwrap();
        assert_eq!(config.env_key_hash.as_deref(), Some(sha256_hex("secret").as_str()));

        let db = memory_db();
        db.insert_api_key("cli", &sha256_hex("bf_stored")).await.unwrap();
        let config = build_auth_config(db, None).await.unwrap();
        assert!(config.env_key_hash.is_none());
    }

    #[tokio::test]
    async fn db_key_is_accepted() {
        let db = memory_db();
        let key = generate_api_key();
        db.insert_api_key("reader", &sha256_hex(&key)).await.unwrap();
        let auth = build_auth_config(db.clone(), None).await;
        let app = crate::test_helpers::test_router_from_parts(db, auth);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/books")
                    .header("Authorization", format!("Bearer {key}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    async fn status_for(app: axum::Router, uri: &str, bearer: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn open_router_passes_everything() {
        let app = test_router().await;
        assert_eq!(status_for(app, "/api/books", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_checks() {
        let (app, key) = test_router_with_auth().await;
        assert_eq!(
            status_for(app.clone(), "/api/books", Some(&key)).await,
            StatusCode::OK
        );
        assert_eq!(
            status_for(app.clone(), "/api/books", Some("wrong-key")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(app.clone(), "/api/books", None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(app.clone(), "/api/readers/r1/preferences", None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(app, "/api/health", None).await, StatusCode::OK);
    }
}
