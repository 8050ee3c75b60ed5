use std::io::Cursor;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::Rng;

use crate::{CoverGenerator, CoverImage, GenError};

pub const COVER_WIDTH: u32 = 600;
pub const COVER_HEIGHT: u32 = 800;
/// Upper bound for each color channel, keeping covers dark enough for
/// light lettering.
pub const MAX_CHANNEL: u8 = 150;

/// Solid-color PNG covers. Needs no API key; the prompt is ignored.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderCovers;

impl PlaceholderCovers {
    pub fn new() -> Self {
        Self
    }

    pub fn random_color() -> Rgb<u8> {
        let mut rng = rand::thread_rng();
        Rgb([
            rng.gen_range(0..=MAX_CHANNEL),
            rng.gen_range(0..=MAX_CHANNEL),
            rng.gen_range(0..=MAX_CHANNEL),
        ])
    }

    pub fn render(color: Rgb<u8>) -> Result<CoverImage, GenError> {
        let img = RgbImage::from_pixel(COVER_WIDTH, COVER_HEIGHT, color);
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| GenError::Image(e.to_string()))?;
        Ok(CoverImage::png(buf))
    }
}

#[async_trait]
impl CoverGenerator for PlaceholderCovers {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(&self, _prompt: &str) -> Result<CoverImage, GenError> {
        let color = Self::random_color();
        tokio::task::spawn_blocking(move || Self::render(color))
            .await
            .map_err(|e| GenError::Image(e.to_string()))?
    }
}
