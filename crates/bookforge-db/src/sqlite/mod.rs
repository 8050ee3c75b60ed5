pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use bookforge_core::api_key::ApiKey;
use bookforge_core::book::{Book, BookFilter, CreateBook, UpdateBook};
use bookforge_core::preferences::ReaderPreferences;

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
///
/// `.to_db()?` is the shortest way to propagate rusqlite failures inside the
/// query modules.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("bookforge.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).map_err(map_sqlite_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .map_err(map_sqlite_err)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_err)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(map_sqlite_err)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }

    /// Run a synchronous query on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

/// Map a `rusqlite::Error` into a `DbError`, keeping constraint violations
/// distinguishable.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Conflict(e.to_string())
        }
        other => DbError::Internal(other.to_string()),
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Books --
    async fn create_book(&self, input: &CreateBook) -> Result<Book, DbError> {
        let input = input.clone();
        self.blocking(move |db| db.create_book_sync(&input)).await
    }
    async fn get_book(&self, id: &str) -> Result<Book, DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.get_book_sync(&id)).await
    }
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, DbError> {
        let filter = filter.clone();
        self.blocking(move |db| db.list_books_sync(&filter)).await
    }
    async fn count_books(&self, filter: &BookFilter) -> Result<i64, DbError> {
        let filter = filter.clone();
        self.blocking(move |db| db.count_books_sync(&filter)).await
    }
    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, DbError> {
        let id = id.to_string();
        let update = update.clone();
        self.blocking(move |db| db.update_book_sync(&id, &update)).await
    }
    async fn delete_book(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.delete_book_sync(&id)).await
    }

    // -- Reader preferences --
    async fn get_preferences(
        &self,
        reader_id: &str,
    ) -> Result<Option<ReaderPreferences>, DbError> {
        let reader_id = reader_id.to_string();
        self.blocking(move |db| db.get_preferences_sync(&reader_id)).await
    }
    async fn upsert_preferences(
        &self,
        prefs: &ReaderPreferences,
    ) -> Result<ReaderPreferences, DbError> {
        let prefs = prefs.clone();
        self.blocking(move |db| db.upsert_preferences_sync(&prefs)).await
    }

    // -- API keys --
    async fn insert_api_key(&self, name: &str, key_hash: &str) -> Result<ApiKey, DbError> {
        let name = name.to_string();
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.insert_api_key_sync(&name, &key_hash))
            .await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        let key_hash = key_hash.to_string();
        self.blocking(move |db| db.find_api_key_by_hash_sync(&key_hash))
            .await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.touch_api_key_sync(&id)).await
    }
    async fn has_api_keys(&self) -> Result<bool, DbError> {
        self.blocking(|db| db.has_api_keys_sync()).await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.blocking(|db| db.list_api_keys_sync()).await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.delete_api_key_sync(&id)).await
    }
}
