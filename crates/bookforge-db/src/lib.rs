#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bookforge_core::api_key::ApiKey;
use bookforge_core::book::{Book, BookFilter, CreateBook, UpdateBook};
use bookforge_core::preferences::ReaderPreferences;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence for books, reader preferences and API keys.
///
/// Implemented by `SqliteDatabase` (local default) and `PostgresDatabase`
/// (hosted table). Both backends must behave identically; the shared
/// assertions live in `tests/common`.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Books --
    async fn create_book(&self, input: &CreateBook) -> Result<Book, DbError>;
    async fn get_book(&self, id: &str) -> Result<Book, DbError>;
    /// Newest first. `limit`/`offset` page through the result.
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, DbError>;
    /// Count ignoring `limit`/`offset`.
    async fn count_books(&self, filter: &BookFilter) -> Result<i64, DbError>;
    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, DbError>;
    async fn delete_book(&self, id: &str) -> Result<(), DbError>;

    // -- Reader preferences --
    async fn get_preferences(&self, reader_id: &str)
        -> Result<Option<ReaderPreferences>, DbError>;
    async fn upsert_preferences(
        &self,
        prefs: &ReaderPreferences,
    ) -> Result<ReaderPreferences, DbError>;

    // -- API keys --
    async fn insert_api_key(&self, name: &str, key_hash: &str) -> Result<ApiKey, DbError>;
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError>;
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError>;
    async fn has_api_keys(&self) -> Result<bool, DbError>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError>;
}

/// Which backend `open_database` should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbBackend {
    Sqlite,
    Postgres,
}

impl DbBackend {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "sqlite" => Some(DbBackend::Sqlite),
            "postgres" | "postgresql" => Some(DbBackend::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub backend: DbBackend,
    /// SQLite file. Defaults to `<data_dir>/bookforge.db`.
    pub sqlite_path: Option<String>,
    /// Postgres connection string.
    pub database_url: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: DbBackend::Sqlite,
            sqlite_path: None,
            database_url: None,
        }
    }
}

impl DbConfig {
    /// Build from `BOOKFORGE_DB_BACKEND`, `BOOKFORGE_SQLITE_PATH` and
    /// `DATABASE_URL`. A `DATABASE_URL` without an explicit backend selects
    /// Postgres.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok();
        let backend = std::env::var("BOOKFORGE_DB_BACKEND")
            .ok()
            .and_then(|b| DbBackend::parse_str(&b))
            .unwrap_or(if database_url.is_some() {
                DbBackend::Postgres
            } else {
                DbBackend::Sqlite
            });
        Self {
            backend,
            sqlite_path: std::env::var("BOOKFORGE_SQLITE_PATH").ok(),
            database_url,
        }
    }
}

/// Open the configured backend and run its migrations.
pub async fn open_database(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    match config.backend {
        DbBackend::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                let db = SqliteDatabase::open(config)?;
                tracing::info!("using sqlite database");
                Ok(Arc::new(db))
            }
            #[cfg(not(feature = "sqlite"))]
            {
                Err(DbError::Internal(
                    "sqlite backend requested but the 'sqlite' feature is not enabled".into(),
                ))
            }
        }
        DbBackend::Postgres => {
            #[cfg(feature = "postgres")]
            {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    DbError::Internal("postgres backend requires DATABASE_URL".into())
                })?;
                let db = PostgresDatabase::connect(url).await?;
                tracing::info!("using postgres database");
                Ok(Arc::new(db))
            }
            #[cfg(not(feature = "postgres"))]
            {
                Err(DbError::Internal(
                    "postgres backend requested but the 'postgres' feature is not enabled".into(),
                ))
            }
        }
    }
}

/// Base directory for local state: `$XDG_DATA_HOME/bookforge` or
/// `~/.local/share/bookforge`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("bookforge")
}
