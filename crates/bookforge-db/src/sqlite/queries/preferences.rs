use rusqlite::{params, Row};

use bookforge_core::preferences::{FontFamily, ReaderPreferences, Theme};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_preferences(row: &Row) -> rusqlite::Result<ReaderPreferences> {
    let theme: String = row.get("theme")?;
    let font_family: String = row.get("font_family")?;
    Ok(ReaderPreferences {
        reader_id: row.get("reader_id")?,
        theme: Theme::parse_str(&theme).unwrap_or(Theme::Light),
        font_family: FontFamily::parse_str(&font_family).unwrap_or(FontFamily::Serif),
        font_size: row.get("font_size")?,
        words_per_page: row.get("words_per_page")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn get_preferences_sync(
        &self,
        reader_id: &str,
    ) -> Result<Option<ReaderPreferences>, DbError> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM reader_preferences WHERE reader_id = ?1",
                params![reader_id],
                row_to_preferences,
            );
            match result {
                Ok(prefs) => Ok(Some(prefs)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(DbError::Internal(e.to_string())),
            }
        })
    }

    pub fn upsert_preferences_sync(
        &self,
        prefs: &ReaderPreferences,
    ) -> Result<ReaderPreferences, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reader_preferences
                     (reader_id, theme, font_family, font_size, words_per_page, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(reader_id) DO UPDATE SET
                     theme = excluded.theme,
                     font_family = excluded.font_family,
                     font_size = excluded.font_size,
                     words_per_page = excluded.words_per_page,
                     updated_at = excluded.updated_at",
                params![
                    prefs.reader_id,
                    prefs.theme.as_str(),
                    prefs.font_family.as_str(),
                    prefs.font_size,
                    prefs.words_per_page,
                    prefs.updated_at
                ],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM reader_preferences WHERE reader_id = ?1",
                params![prefs.reader_id],
                row_to_preferences,
            )
            .to_db()
        })
    }
}
