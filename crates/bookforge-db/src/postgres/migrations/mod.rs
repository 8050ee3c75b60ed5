use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// Fixed key for the Postgres advisory lock that serialises migration runs
/// across server replicas.
const MIGRATION_LOCK_KEY: i64 = 0x626F_6F6B_666F_7267; // "bookforg"

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Session-level lock: lock, migrate and unlock on the same connection.
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    let result = run_inner(&mut conn).await;

    // Release even when a migration failed.
    let _ = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await;

    result
}

async fn run_inner(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::Internal(e.to_string()))?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;

    let steps: [(i32, &str); 3] = [
        (1, include_str!("sql/V1__initial.sql")),
        (2, include_str!("sql/V2__gallery.sql")),
        (3, include_str!("sql/V3__reader_preferences.sql")),
    ];

    for (version, sql) in steps {
        if current >= version {
            continue;
        }
        sqlx::raw_sql(sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::Internal(format!("migration V{version}: {e}")))?;
        sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES ($1, NOW())")
            .bind(version)
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?;
        tracing::info!(version, "applied postgres migration");
    }

    Ok(())
}
