use std::sync::Arc;

use async_trait::async_trait;
use bookforge_core::book::{Book, BookFilter, BookSummary, CreateBook, UpdateBook};
use bookforge_core::pagination;
use bookforge_core::parse::{parse_generated_book, ParseError};
use bookforge_core::preferences::{self, ReaderPreferences, UpdatePreferences};
use bookforge_core::CoreError;
use bookforge_db::{Database, DbError};
use bookforge_genai::{CoverGenerator, CoverImage, GenError, TextGenerator};
use bookforge_store::{content_type_for_key, cover_key, ObjectStore, StoreError};

use crate::traits::{DEFAULT_GALLERY_LIMIT, MAX_GALLERY_LIMIT, MAX_IDEA_CHARS};
use crate::{BookService, ForgeRequest, Gallery, ReadRequest, ReaderView, ServiceError};

/// In-process implementation: database, cover store and generation clients.
pub struct LocalService {
    db: Arc<dyn Database>,
    store: Arc<dyn ObjectStore>,
    text: Arc<dyn TextGenerator>,
    covers: Arc<dyn CoverGenerator>,
}

impl LocalService {
    pub fn new(
        db: Arc<dyn Database>,
        store: Arc<dyn ObjectStore>,
        text: Arc<dyn TextGenerator>,
        covers: Arc<dyn CoverGenerator>,
    ) -> Self {
        Self {
            db,
            store,
            text,
            covers,
        }
    }

    /// Generate and store a new cover, returning its object key.
    async fn make_cover(&self, scene: &str, title: &str) -> Result<String, ServiceError> {
        let prompt = bookforge_prompts::cover_prompt(scene, title);
        let image = self.covers.generate(&prompt).await?;
        let key = cover_key(&uuid::Uuid::new_v4().to_string(), image.extension());
        self.store.put(&key, image.bytes).await?;
        tracing::debug!(%key, generator = self.covers.name(), "cover stored");
        Ok(key)
    }

    /// Best-effort removal of a cover that is no longer referenced.
    async fn discard_cover(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(%key, error = %e, "failed to delete cover object");
        }
    }

    async fn preferences_or_default(
        &self,
        reader_id: &str,
    ) -> Result<ReaderPreferences, ServiceError> {
        Ok(self
            .db
            .get_preferences(reader_id)
            .await?
            .unwrap_or_else(|| ReaderPreferences::defaults(reader_id)))
    }
}

fn validate_idea(idea: &str) -> Result<&str, ServiceError> {
    let idea = idea.trim();
    if idea.is_empty() {
        return Err(ServiceError::InvalidInput(
            "an idea is the seed of a story; please provide one".into(),
        ));
    }
    let chars = idea.chars().count();
    if chars > MAX_IDEA_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "idea is too long ({chars} characters, max {MAX_IDEA_CHARS})"
        )));
    }
    Ok(idea)
}

fn validate_reader_id(reader_id: &str) -> Result<&str, ServiceError> {
    let reader_id = reader_id.trim();
    if reader_id.is_empty() {
        return Err(ServiceError::InvalidInput("reader id must not be empty".into()));
    }
    Ok(reader_id)
}

fn validate_filter(filter: &BookFilter) -> Result<(), ServiceError> {
    if filter.limit.is_some_and(|l| l < 0) || filter.offset.is_some_and(|o| o < 0) {
        return Err(ServiceError::InvalidInput(
            "limit and offset must not be negative".into(),
        ));
    }
    Ok(())
}

// -- Error conversions at the crate seams --

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::Conflict(msg) => ServiceError::InvalidInput(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => ServiceError::NotFound(format!("cover {key}")),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<GenError> for ServiceError {
    fn from(e: GenError) -> Self {
        match e {
            GenError::MissingApiKey(_) | GenError::Config(_) => {
                ServiceError::Internal(e.to_string())
            }
            other => ServiceError::Generation(other.to_string()),
        }
    }
}

impl From<ParseError> for ServiceError {
    fn from(e: ParseError) -> Self {
        ServiceError::Generation(e.user_message())
    }
}

impl From<CoreError> for ServiceError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound(msg) => ServiceError::NotFound(msg),
            CoreError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

#[async_trait]
impl BookService for LocalService {
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, ServiceError> {
        validate_filter(filter)?;
        let books = self.db.list_books(filter).await?;
        Ok(books.iter().map(Book::summary).collect())
    }

    async fn gallery(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Gallery, ServiceError> {
        let limit = limit
            .unwrap_or(DEFAULT_GALLERY_LIMIT)
            .clamp(1, MAX_GALLERY_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let filter = BookFilter {
            limit: Some(limit),
            offset: Some(offset),
            ..BookFilter::public()
        };
        let books = self.db.list_books(&filter).await?;
        let total = self.db.count_books(&BookFilter::public()).await?;
        Ok(Gallery {
            books: books.iter().map(Book::summary).collect(),
            total,
            limit,
            offset,
        })
    }

    async fn get_book(&self, id: &str) -> Result<Book, ServiceError> {
        Ok(self.db.get_book(id).await?)
    }

    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, ServiceError> {
        if update.cover_key.is_some() {
            return Err(ServiceError::InvalidInput(
                "cover_key is managed by the server; regenerate the cover instead".into(),
            ));
        }
        let mut update = update.clone();
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            if title.is_empty() {
                return Err(ServiceError::InvalidInput("title must not be empty".into()));
            }
        }
        if let Some(author) = update.author.as_mut() {
            *author = author.trim().to_string();
        }
        Ok(self.db.update_book(id, &update).await?)
    }

    async fn delete_book(&self, id: &str) -> Result<(), ServiceError> {
        let book = self.db.get_book(id).await?;
        self.db.delete_book(id).await?;
        self.discard_cover(&book.cover_key).await;
        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    async fn forge_book(&self, request: &ForgeRequest) -> Result<Book, ServiceError> {
        let idea = validate_idea(&request.idea)?;

        tracing::info!(generator = self.text.name(), "forging book");
        let raw = self.text.generate(&bookforge_prompts::book_prompt(idea)).await?;
        let generated = parse_generated_book(&raw).inspect_err(|e| {
            tracing::warn!(error = %e, response_chars = raw.len(), "unparseable model response");
        })?;

        let scene = if generated.cover_prompt.is_empty() {
            generated.title.clone()
        } else {
            generated.cover_prompt.clone()
        };
        let key = self.make_cover(&scene, &generated.title).await?;

        let input = CreateBook {
            title: generated.title,
            idea: idea.to_string(),
            cover_prompt: scene,
            content: generated.content,
            cover_key: key.clone(),
            author: request.author.trim().to_string(),
            visibility: request.visibility,
        };
        match self.db.create_book(&input).await {
            Ok(book) => {
                tracing::info!(
                    book_id = %book.id,
                    words = book.word_count(),
                    visibility = book.visibility.as_str(),
                    "book forged"
                );
                Ok(book)
            }
            Err(e) => {
                self.discard_cover(&key).await;
                Err(e.into())
            }
        }
    }

    async fn regenerate_cover(&self, id: &str) -> Result<Book, ServiceError> {
        let book = self.db.get_book(id).await?;
        let key = self.make_cover(&book.cover_prompt, &book.title).await?;

        let update = UpdateBook {
            cover_key: Some(key.clone()),
            ..Default::default()
        };
        let updated = match self.db.update_book(id, &update).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_cover(&key).await;
                return Err(e.into());
            }
        };
        if book.cover_key != key {
            self.discard_cover(&book.cover_key).await;
        }
        tracing::info!(book_id = %id, %key, "cover regenerated");
        Ok(updated)
    }

    async fn cover(&self, id: &str) -> Result<CoverImage, ServiceError> {
        let book = self.db.get_book(id).await?;
        let bytes = self.store.get(&book.cover_key).await?;
        Ok(CoverImage {
            bytes,
            mime_type: content_type_for_key(&book.cover_key).to_string(),
        })
    }

    async fn read_page(
        &self,
        id: &str,
        request: &ReadRequest,
    ) -> Result<ReaderView, ServiceError> {
        if let Some(wpp) = request.words_per_page {
            preferences::validate_words_per_page(wpp)?;
        }
        let book = self.db.get_book(id).await?;

        let prefs = match request.reader_id.as_deref() {
            Some(reader_id) => {
                self.preferences_or_default(validate_reader_id(reader_id)?)
                    .await?
            }
            None => ReaderPreferences::defaults(""),
        };
        // Explicit size, then the reader's saved size, then the default
        // (which `defaults` already carries).
        let words_per_page = request.words_per_page.unwrap_or(prefs.words_per_page) as usize;

        let page = pagination::page_at(&book.content, request.page, words_per_page);
        Ok(ReaderView {
            book_id: book.id,
            title: book.title,
            author: book.author,
            page,
            preferences: prefs,
        })
    }

    async fn get_preferences(&self, reader_id: &str) -> Result<ReaderPreferences, ServiceError> {
        self.preferences_or_default(validate_reader_id(reader_id)?)
            .await
    }

    async fn update_preferences(
        &self,
        reader_id: &str,
        update: &UpdatePreferences,
    ) -> Result<ReaderPreferences, ServiceError> {
        let mut prefs = self
            .preferences_or_default(validate_reader_id(reader_id)?)
            .await?;
        prefs.apply(update)?;
        Ok(self.db.upsert_preferences(&prefs).await?)
    }
}

