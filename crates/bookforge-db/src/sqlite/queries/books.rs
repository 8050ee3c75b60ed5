use chrono::Utc;
use rusqlite::{params, Row};

use bookforge_core::book::{Book, BookFilter, CreateBook, UpdateBook, Visibility};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    let visibility: String = row.get("visibility")?;
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        idea: row.get("idea")?,
        cover_prompt: row.get("cover_prompt")?,
        content: row.get("content")?,
        cover_key: row.get("cover_key")?,
        author: row.get("author")?,
        visibility: Visibility::parse_str(&visibility).unwrap_or_default(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// WHERE clause and positional values shared by list and count.
fn filter_clause(filter: &BookFilter) -> (String, Vec<Box<dyn rusqlite::types::ToSql>>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(visibility) = filter.visibility {
        values.push(Box::new(visibility.as_str().to_string()));
        sql.push_str(&format!(" AND visibility = ?{}", values.len()));
    }
    if let Some(ref author) = filter.author {
        values.push(Box::new(author.clone()));
        sql.push_str(&format!(" AND author = ?{}", values.len()));
    }
    (sql, values)
}

impl SqliteDatabase {
    pub fn create_book_sync(&self, input: &CreateBook) -> Result<Book, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO books (id, title, idea, cover_prompt, content, cover_key,
                                    author, visibility, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    input.title,
                    input.idea,
                    input.cover_prompt,
                    input.content,
                    input.cover_key,
                    input.author,
                    input.visibility.as_str(),
                    now,
                    now
                ],
            )
            .to_db()?;
            conn.query_row("SELECT * FROM books WHERE id = ?1", params![id], row_to_book)
                .to_db()
        })
    }

    pub fn get_book_sync(&self, id: &str) -> Result<Book, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM books WHERE id = ?1", params![id], row_to_book)
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("book {id}")),
                    other => DbError::Internal(other.to_string()),
                })
        })
    }

    pub fn list_books_sync(&self, filter: &BookFilter) -> Result<Vec<Book>, DbError> {
        self.with_conn(|conn| {
            let (clause, mut values) = filter_clause(filter);
            let mut sql = format!("SELECT * FROM books{clause} ORDER BY created_at DESC, id DESC");

            if filter.limit.is_some() || filter.offset.is_some() {
                values.push(Box::new(filter.limit.unwrap_or(-1)));
                sql.push_str(&format!(" LIMIT ?{}", values.len()));
                values.push(Box::new(filter.offset.unwrap_or(0)));
                sql.push_str(&format!(" OFFSET ?{}", values.len()));
            }

            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|p| p.as_ref()).collect();
            let mut stmt = conn.prepare(&sql).to_db()?;
            let books = stmt
                .query_map(params_ref.as_slice(), row_to_book)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(books)
        })
    }

    pub fn count_books_sync(&self, filter: &BookFilter) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let (clause, values) = filter_clause(filter);
            let sql = format!("SELECT COUNT(*) FROM books{clause}");
            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|p| p.as_ref()).collect();
            conn.query_row(&sql, params_ref.as_slice(), |r| r.get(0))
                .to_db()
        })
    }

    pub fn update_book_sync(&self, id: &str, update: &UpdateBook) -> Result<Book, DbError> {
        self.with_conn(|conn| {
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(ref title) = update.title {
                sets.push("title = ?");
                values.push(Box::new(title.clone()));
            }
            if let Some(ref author) = update.author {
                sets.push("author = ?");
                values.push(Box::new(author.clone()));
            }
            if let Some(visibility) = update.visibility {
                sets.push("visibility = ?");
                values.push(Box::new(visibility.as_str().to_string()));
            }
            if let Some(ref cover_key) = update.cover_key {
                sets.push("cover_key = ?");
                values.push(Box::new(cover_key.clone()));
            }

            if !sets.is_empty() {
                sets.push("updated_at = ?");
                values.push(Box::new(Utc::now()));
                values.push(Box::new(id.to_string()));

                let sql = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));
                let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
                let changed = conn.execute(&sql, params.as_slice()).to_db()?;
                if changed == 0 {
                    return Err(DbError::NotFound(format!("book {id}")));
                }
            }

            conn.query_row("SELECT * FROM books WHERE id = ?1", params![id], row_to_book)
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("book {id}")),
                    other => DbError::Internal(other.to_string()),
                })
        })
    }

    pub fn delete_book_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute("DELETE FROM books WHERE id = ?1", params![id])
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("book {id}")));
            }
            Ok(())
        })
    }
}
