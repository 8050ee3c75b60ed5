pub(crate) mod migrations;
pub mod queries;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bookforge_core::api_key::ApiKey;
use bookforge_core::book::{Book, BookFilter, CreateBook, UpdateBook};
use bookforge_core::preferences::ReaderPreferences;

use crate::{Database, DbError};

/// Map a sqlx::Error into a DbError, keeping unique violations distinguishable.
pub(crate) fn pg_err(e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return DbError::Conflict(db_err.message().to_string());
        }
    }
    DbError::Internal(e.to_string())
}

/// Create a DbError::NotFound with the given entity description.
pub(crate) fn pg_not_found(entity: &str) -> DbError {
    DbError::NotFound(entity.to_string())
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pub(crate) pool: PgPool,
}

impl PostgresDatabase {
    /// Connect to a Postgres database and run migrations.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(pg_err)?;

        let db = Self { pool };
        migrations::run(&db.pool).await?;
        Ok(db)
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    // -- Books --
    async fn create_book(&self, input: &CreateBook) -> Result<Book, DbError> {
        self.pg_create_book(input).await
    }
    async fn get_book(&self, id: &str) -> Result<Book, DbError> {
        self.pg_get_book(id).await
    }
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, DbError> {
        self.pg_list_books(filter).await
    }
    async fn count_books(&self, filter: &BookFilter) -> Result<i64, DbError> {
        self.pg_count_books(filter).await
    }
    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, DbError> {
        self.pg_update_book(id, update).await
    }
    async fn delete_book(&self, id: &str) -> Result<(), DbError> {
        self.pg_delete_book(id).await
    }

    // -- Reader preferences --
    async fn get_preferences(
        &self,
        reader_id: &str,
    ) -> Result<Option<ReaderPreferences>, DbError> {
        self.pg_get_preferences(reader_id).await
    }
    async fn upsert_preferences(
        &self,
        prefs: &ReaderPreferences,
    ) -> Result<ReaderPreferences, DbError> {
        self.pg_upsert_preferences(prefs).await
    }

    // -- API keys --
    async fn insert_api_key(&self, name: &str, key_hash: &str) -> Result<ApiKey, DbError> {
        self.pg_insert_api_key(name, key_hash).await
    }
    async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, DbError> {
        self.pg_find_api_key_by_hash(key_hash).await
    }
    async fn touch_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_touch_api_key(id).await
    }
    async fn has_api_keys(&self) -> Result<bool, DbError> {
        self.pg_has_api_keys().await
    }
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>, DbError> {
        self.pg_list_api_keys().await
    }
    async fn delete_api_key(&self, id: &str) -> Result<(), DbError> {
        self.pg_delete_api_key(id).await
    }
}
