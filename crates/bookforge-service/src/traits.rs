use async_trait::async_trait;
use bookforge_core::book::{Book, BookFilter, BookSummary, UpdateBook, Visibility};
use bookforge_core::pagination::Page;
use bookforge_core::preferences::{ReaderPreferences, UpdatePreferences};
use bookforge_genai::CoverImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_IDEA_CHARS: usize = 4000;
pub const DEFAULT_GALLERY_LIMIT: i64 = 20;
pub const MAX_GALLERY_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A provider failed or answered in an unusable shape. The message is
    /// safe to show to the person who asked for the book.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("unauthorized: {0} (set BOOKFORGE_API_KEY or pass --api-key)")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// A story idea to turn into a book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeRequest {
    pub idea: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadRequest {
    /// Zero-based; out-of-range values are clamped.
    #[serde(default)]
    pub page: i64,
    /// Overrides the reader's saved page size for this request.
    pub words_per_page: Option<u32>,
    pub reader_id: Option<String>,
}

/// One page of a book plus the display settings to render it with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderView {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub page: Page,
    pub preferences: ReaderPreferences,
}

/// A page of the public gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub books: Vec<BookSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Everything the server routes and the CLI can do with books.
///
/// `LocalService` runs the pipeline in-process against a database, an object
/// store and the generation clients. `HttpService` talks to a running
/// bookforge-server.
#[async_trait]
pub trait BookService: Send + Sync {
    // -- Library --
    async fn list_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, ServiceError>;
    async fn gallery(&self, limit: Option<i64>, offset: Option<i64>)
        -> Result<Gallery, ServiceError>;
    async fn get_book(&self, id: &str) -> Result<Book, ServiceError>;
    async fn update_book(&self, id: &str, update: &UpdateBook) -> Result<Book, ServiceError>;
    async fn delete_book(&self, id: &str) -> Result<(), ServiceError>;

    // -- Generation --
    /// Idea → text → parse → cover → store → persist.
    async fn forge_book(&self, request: &ForgeRequest) -> Result<Book, ServiceError>;
    async fn regenerate_cover(&self, id: &str) -> Result<Book, ServiceError>;
    async fn cover(&self, id: &str) -> Result<CoverImage, ServiceError>;

    // -- Reader --
    async fn read_page(&self, id: &str, request: &ReadRequest)
        -> Result<ReaderView, ServiceError>;
    async fn get_preferences(&self, reader_id: &str) -> Result<ReaderPreferences, ServiceError>;
    async fn update_preferences(
        &self,
        reader_id: &str,
        update: &UpdatePreferences,
    ) -> Result<ReaderPreferences, ServiceError>;
}
