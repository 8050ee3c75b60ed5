//! Clients for the two generation steps of forging a book: narrative text and
//! a cover image. Each step sits behind a trait so the service can swap
//! providers (or mocks) without knowing which one is live.

pub mod config;
pub mod error;
pub mod gemini;
pub mod imagen;
pub mod mock;
pub mod placeholder;

pub use config::{
    build_cover_generator, build_text_generator, CoverBackend, GenConfig, UnavailableText,
};
pub use error::GenError;
pub use gemini::GeminiClient;
pub use imagen::ImagenClient;
pub use mock::{MockCoverGenerator, MockTextGenerator};
pub use placeholder::PlaceholderCovers;

use async_trait::async_trait;
use bytes::Bytes;

/// Produces the raw tag-delimited response for a book prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenError>;
}

/// Produces a cover illustration for an image prompt.
#[async_trait]
pub trait CoverGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<CoverImage, GenError>;
}

/// Encoded image bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl CoverImage {
    pub fn png(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: "image/png".to_string(),
        }
    }

    /// File extension for the object key.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}
