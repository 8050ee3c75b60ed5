use chrono::Utc;
use rusqlite::{params, Connection};

use super::SqliteResultExt;
use crate::DbError;

pub(crate) const LATEST_VERSION: i64 = 3;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .to_db()?;

    let has_column = |table: &str, col: &str| -> bool {
        conn.prepare(&format!("SELECT {col} FROM {table} LIMIT 0"))
            .is_ok()
    };

    if current_version < 1 {
        // v1: book records and API keys
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS books (
                id           TEXT PRIMARY KEY,
                title        TEXT NOT NULL,
                idea         TEXT NOT NULL DEFAULT '',
                cover_prompt TEXT NOT NULL DEFAULT '',
                content      TEXT NOT NULL,
                cover_key    TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_books_created ON books(created_at);

            CREATE TABLE IF NOT EXISTS api_keys (
                id           TEXT PRIMARY KEY,
                name         TEXT NOT NULL DEFAULT '',
                key_hash     TEXT NOT NULL UNIQUE,
                created_at   TEXT NOT NULL,
                last_used_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_api_keys_hash ON api_keys(key_hash);",
        )
        .to_db()?;
        record_version(conn, 1)?;
    }

    if current_version < 2 {
        // v2: community gallery
        if !has_column("books", "visibility") {
            conn.execute_batch(
                "ALTER TABLE books ADD COLUMN author TEXT NOT NULL DEFAULT '';
                 ALTER TABLE books ADD COLUMN visibility TEXT NOT NULL DEFAULT 'private'
                     CHECK(visibility IN ('private', 'public'));",
            )
            .to_db()?;
        }
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_books_visibility
                 ON books(visibility, created_at);",
        )
        .to_db()?;
        record_version(conn, 2)?;
    }

    if current_version < 3 {
        // v3: reader preferences
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reader_preferences (
                reader_id      TEXT PRIMARY KEY,
                theme          TEXT NOT NULL DEFAULT 'light'
                                   CHECK(theme IN ('light', 'sepia', 'dark')),
                font_family    TEXT NOT NULL DEFAULT 'serif'
                                   CHECK(font_family IN ('serif', 'sans_serif', 'monospace')),
                font_size      INTEGER NOT NULL DEFAULT 18,
                words_per_page INTEGER NOT NULL DEFAULT 250,
                updated_at     TEXT NOT NULL
            );",
        )
        .to_db()?;
        record_version(conn, 3)?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i64) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![version, Utc::now().to_rfc3339()],
    )
    .to_db()?;
    Ok(())
}
