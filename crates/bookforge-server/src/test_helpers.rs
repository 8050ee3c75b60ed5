use std::sync::Arc;

use axum::Router;
use bookforge_db::Database;
use bookforge_genai::{MockCoverGenerator, MockTextGenerator};
use bookforge_service::LocalService;
use bookforge_store::StoreConfig;
use tokio::net::TcpListener;

use crate::auth::{generate_api_key, sha256_hex, AuthConfig};
use crate::routes::InnerAppState;

/// The canned book every test router forges: 3 chapters, 600 words.
pub fn sample_text_generator() -> MockTextGenerator {
    let chapter = |n: usize| {
        let words: Vec<String> = (1..=200).map(|i| format!("c{n}w{i}")).collect();
        format!("## Chapter {n}\n\n{}", words.join(" "))
    };
    MockTextGenerator::book(
        "The Lighthouse Clock",
        "A lighthouse whose beam sweeps like a clock hand",
        &[chapter(1), chapter(2), chapter(3)].join("\n\n"),
    )
}

fn temp_service(
    db: Arc<dyn Database>,
    text: MockTextGenerator,
    covers: MockCoverGenerator,
) -> LocalService {
    let store_config = StoreConfig {
        local_data_dir: Some(
            tempfile::tempdir()
                .unwrap()
                .keep()
                .to_string_lossy()
                .to_string(),
        ),
        ..Default::default()
    };
    let store = bookforge_store::create_store(&store_config).unwrap();
    LocalService::new(db, store, Arc::new(text), Arc::new(covers))
}

fn memory_db() -> Arc<dyn Database> {
    Arc::new(bookforge_db::SqliteDatabase::open_in_memory().unwrap())
}

/// Router over an existing database and auth setting, with mock generators.
pub fn test_router_from_parts(db: Arc<dyn Database>, auth: Option<Arc<AuthConfig>>) -> Router {
    let service = temp_service(db, sample_text_generator(), MockCoverGenerator::success());
    crate::build_router(Arc::new(InnerAppState { service, auth }))
}

/// In-memory SQLite, temp-dir cover store, mock generators, no auth.
pub async fn test_router() -> Router {
    test_router_from_parts(memory_db(), None)
}

/// Like `test_router` but with custom generators.
pub async fn test_router_with(text: MockTextGenerator, covers: MockCoverGenerator) -> Router {
    let service = temp_service(memory_db(), text, covers);
    crate::build_router(Arc::new(InnerAppState { service, auth: None }))
}

/// Auth enabled through an env-style key. Returns (router, api_key).
pub async fn test_router_with_auth() -> (Router, String) {
    let db = memory_db();
    let api_key = generate_api_key();
    let auth = Arc::new(AuthConfig {
        env_key_hash: Some(sha256_hex(&api_key)),
        db: db.clone(),
    });
    (test_router_from_parts(db, Some(auth)), api_key)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Serve `app` on 127.0.0.1 with a random port.
pub async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        _handle: handle,
    }
}

pub async fn spawn_test_server() -> TestServer {
    spawn_router(test_router().await).await
}
