use chrono::{DateTime, Utc};

use bookforge_core::preferences::{FontFamily, ReaderPreferences, Theme};

use super::super::{pg_err, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct PreferencesRow {
    reader_id: String,
    theme: String,
    font_family: String,
    font_size: i32,
    words_per_page: i32,
    updated_at: DateTime<Utc>,
}

impl From<PreferencesRow> for ReaderPreferences {
    fn from(r: PreferencesRow) -> Self {
        ReaderPreferences {
            reader_id: r.reader_id,
            theme: Theme::parse_str(&r.theme).unwrap_or(Theme::Light),
            font_family: FontFamily::parse_str(&r.font_family).unwrap_or(FontFamily::Serif),
            font_size: r.font_size.max(0) as u32,
            words_per_page: r.words_per_page.max(0) as u32,
            updated_at: r.updated_at,
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_get_preferences(
        &self,
        reader_id: &str,
    ) -> Result<Option<ReaderPreferences>, DbError> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            "SELECT * FROM reader_preferences WHERE reader_id = $1",
        )
        .bind(reader_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.map(|r| r.into()))
    }

    pub(crate) async fn pg_upsert_preferences(
        &self,
        prefs: &ReaderPreferences,
    ) -> Result<ReaderPreferences, DbError> {
        let row = sqlx::query_as::<_, PreferencesRow>(
            "INSERT INTO reader_preferences
                 (reader_id, theme, font_family, font_size, words_per_page, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (reader_id) DO UPDATE SET
                 theme = EXCLUDED.theme,
                 font_family = EXCLUDED.font_family,
                 font_size = EXCLUDED.font_size,
                 words_per_page = EXCLUDED.words_per_page,
                 updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(&prefs.reader_id)
        .bind(prefs.theme.as_str())
        .bind(prefs.font_family.as_str())
        .bind(prefs.font_size as i32)
        .bind(prefs.words_per_page as i32)
        .bind(prefs.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(row.into())
    }
}
