use std::sync::Mutex;

use async_trait::async_trait;

use crate::{CoverGenerator, CoverImage, GenError, TextGenerator};

/// Returns a canned response (or failure) and records every prompt.
pub struct MockTextGenerator {
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn success(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A response in the expected tag format.
    pub fn book(title: &str, cover_prompt: &str, content: &str) -> Self {
        Self::success(&format!(
            "[TITLE]{title}[/TITLE][COVER_PROMPT]{cover_prompt}[/COVER_PROMPT][CONTENT]{content}[/CONTENT]"
        ))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.response.clone().map_err(|message| GenError::Api {
            provider: "mock",
            status: 500,
            message,
        })
    }
}

/// Returns a fixed image, or fails, and records every prompt.
pub struct MockCoverGenerator {
    image: Option<CoverImage>,
    prompts: Mutex<Vec<String>>,
}

/// Smallest byte string that still looks like a PNG to sniffers.
pub const MOCK_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

impl MockCoverGenerator {
    pub fn success() -> Self {
        Self::with_image(CoverImage::png(MOCK_PNG))
    }

    pub fn with_image(image: CoverImage) -> Self {
        Self {
            image: Some(image),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failure() -> Self {
        Self {
            image: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CoverGenerator for MockCoverGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<CoverImage, GenError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.image
            .clone()
            .ok_or_else(|| GenError::Blocked("mock cover failure".into()))
    }
}
