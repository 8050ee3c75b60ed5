use chrono::{DateTime, Utc};

use bookforge_core::book::{Book, BookFilter, CreateBook, UpdateBook, Visibility};

use super::super::{pg_err, pg_not_found, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    idea: String,
    cover_prompt: String,
    content: String,
    cover_key: String,
    author: String,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(r: BookRow) -> Self {
        Book {
            id: r.id,
            title: r.title,
            idea: r.idea,
            cover_prompt: r.cover_prompt,
            content: r.content,
            cover_key: r.cover_key,
            author: r.author,
            visibility: Visibility::parse_str(&r.visibility).unwrap_or_default(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// WHERE clause with `$n` placeholders plus the string values to bind in order.
fn filter_clause(filter: &BookFilter) -> (String, Vec<String>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut params = Vec::new();

    if let Some(visibility) = filter.visibility {
        params.push(visibility.as_str().to_string());
        sql.push_str(&format!(" AND visibility = ${}", params.len()));
    }
    if let Some(ref author) = filter.author {
        params.push(author.clone());
        sql.push_str(&format!(" AND author = ${}", params.len()));
    }
    (sql, params)
}

impl PostgresDatabase {
    pub(crate) async fn pg_create_book(&self, input: &CreateBook) -> Result<Book, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO books (id, title, idea, cover_prompt, content, cover_key,
                                author, visibility, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.idea)
        .bind(&input.cover_prompt)
        .bind(&input.content)
        .bind(&input.cover_key)
        .bind(&input.author)
        .bind(input.visibility.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(pg_err)?;

        self.pg_get_book(&id).await
    }

    pub(crate) async fn pg_get_book(&self, id: &str) -> Result<Book, DbError> {
        let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?
            .ok_or_else(|| pg_not_found(&format!("book {id}")))?;

        Ok(row.into())
    }

    pub(crate) async fn pg_list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, DbError> {
        let (clause, params) = filter_clause(filter);
        let mut sql = format!("SELECT * FROM books{clause} ORDER BY created_at DESC, id DESC");
        let mut param_idx = params.len() + 1;

        if filter.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${param_idx}"));
            param_idx += 1;
        }
        if filter.offset.is_some() {
            sql.push_str(&format!(" OFFSET ${param_idx}"));
        }

        let mut query = sqlx::query_as::<_, BookRow>(&sql);
        for p in &params {
            query = query.bind(p);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(pg_err)?;
        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    pub(crate) async fn pg_count_books(&self, filter: &BookFilter) -> Result<i64, DbError> {
        let (clause, params) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM books{clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for p in &params {
            query = query.bind(p);
        }
        query.fetch_one(&self.pool).await.map_err(pg_err)
    }

    pub(crate) async fn pg_update_book(
        &self,
        id: &str,
        update: &UpdateBook,
    ) -> Result<Book, DbError> {
        let mut sets = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = update.title {
            params.push(title.clone());
            sets.push(format!("title = ${}", params.len()));
        }
        if let Some(ref author) = update.author {
            params.push(author.clone());
            sets.push(format!("author = ${}", params.len()));
        }
        if let Some(visibility) = update.visibility {
            params.push(visibility.as_str().to_string());
            sets.push(format!("visibility = ${}", params.len()));
        }
        if let Some(ref cover_key) = update.cover_key {
            params.push(cover_key.clone());
            sets.push(format!("cover_key = ${}", params.len()));
        }

        if sets.is_empty() {
            return self.pg_get_book(id).await;
        }

        let updated_idx = params.len() + 1;
        let id_idx = params.len() + 2;
        sets.push(format!("updated_at = ${updated_idx}"));
        let sql = format!(
            "UPDATE books SET {} WHERE id = ${id_idx}",
            sets.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for p in &params {
            query = query.bind(p);
        }
        let result = query
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            return Err(pg_not_found(&format!("book {id}")));
        }
        self.pg_get_book(id).await
    }

    pub(crate) async fn pg_delete_book(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(pg_err)?;

        if result.rows_affected() == 0 {
            return Err(pg_not_found(&format!("book {id}")));
        }
        Ok(())
    }
}
