use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::gemini::DEFAULT_TEXT_MODEL;
use crate::imagen::DEFAULT_IMAGE_MODEL;
use crate::{CoverGenerator, GeminiClient, GenError, ImagenClient, PlaceholderCovers, TextGenerator};

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which cover generator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverBackend {
    /// Solid-color PNGs, no network.
    #[default]
    Placeholder,
    /// Google Imagen.
    Imagen,
}

impl CoverBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverBackend::Placeholder => "placeholder",
            CoverBackend::Imagen => "imagen",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "placeholder" => Some(CoverBackend::Placeholder),
            "imagen" => Some(CoverBackend::Imagen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenConfig {
    pub api_key: Option<String>,
    pub text_model: String,
    pub cover_backend: CoverBackend,
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            cover_backend: CoverBackend::Placeholder,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GenConfig {
    /// Read `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), `BOOKFORGE_TEXT_MODEL`,
    /// `BOOKFORGE_COVER_BACKEND`, `BOOKFORGE_IMAGE_MODEL` and
    /// `BOOKFORGE_GEN_TIMEOUT_SECS`. An unknown cover backend is an error.
    pub fn from_env() -> Result<Self, GenError> {
        let defaults = Self::default();
        let cover_backend = match std::env::var("BOOKFORGE_COVER_BACKEND") {
            Ok(value) => CoverBackend::parse_str(&value).ok_or_else(|| {
                GenError::Config(format!("unknown cover backend: {value}"))
            })?,
            Err(_) => defaults.cover_backend,
        };
        let timeout = match std::env::var("BOOKFORGE_GEN_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(value.parse().map_err(|_| {
                GenError::Config(format!("invalid timeout: {value}"))
            })?),
            Err(_) => defaults.timeout,
        };
        Ok(Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            text_model: std::env::var("BOOKFORGE_TEXT_MODEL").unwrap_or(defaults.text_model),
            cover_backend,
            image_model: std::env::var("BOOKFORGE_IMAGE_MODEL").unwrap_or(defaults.image_model),
            timeout,
        })
    }

    fn require_key(&self) -> Result<&str, GenError> {
        self.api_key
            .as_deref()
            .ok_or(GenError::MissingApiKey("GEMINI_API_KEY"))
    }
}

pub fn build_text_generator(config: &GenConfig) -> Result<Arc<dyn TextGenerator>, GenError> {
    let client = GeminiClient::new(config.require_key()?, config.timeout)?
        .with_model(&config.text_model);
    tracing::info!(model = %config.text_model, "using gemini text generator");
    Ok(Arc::new(client))
}

pub fn build_cover_generator(config: &GenConfig) -> Result<Arc<dyn CoverGenerator>, GenError> {
    match config.cover_backend {
        CoverBackend::Placeholder => {
            tracing::info!("using placeholder covers");
            Ok(Arc::new(PlaceholderCovers::new()))
        }
        CoverBackend::Imagen => {
            let client = ImagenClient::new(config.require_key()?, config.timeout)?
                .with_model(&config.image_model);
            tracing::info!(model = %config.image_model, "using imagen covers");
            Ok(Arc::new(client))
        }
    }
}

/// Stands in for the text generator when none could be built, so the rest
/// of the server (library, gallery, reader) keeps working.
pub struct UnavailableText {
    reason: String,
}

impl UnavailableText {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for UnavailableText {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenError> {
        Err(GenError::Config(format!(
            "text generation is not configured: {}",
            self.reason
        )))
    }
}
