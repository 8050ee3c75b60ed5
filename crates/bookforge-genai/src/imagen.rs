use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::gemini::{check_status, GEMINI_API_URL};
use crate::{CoverGenerator, CoverImage, GenError};

pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
/// Portrait, close to the 600x800 placeholder covers.
pub const COVER_ASPECT_RATIO: &str = "3:4";

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    aspect_ratio: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    rai_filtered_reason: Option<String>,
}

/// Cover images from the Imagen `predict` endpoint.
pub struct ImagenClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ImagenClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CoverGenerator for ImagenClient {
    fn name(&self) -> &str {
        "imagen"
    }

    async fn generate(&self, prompt: &str) -> Result<CoverImage, GenError> {
        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
            }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: COVER_ASPECT_RATIO,
            },
        };

        tracing::debug!(model = %self.model, "requesting cover image");
        let response = self
            .client
            .post(format!("{}/models/{}:predict", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body = check_status("imagen", response).await?;
        let parsed: PredictResponse =
            serde_json::from_str(&body).map_err(|e| GenError::Decode(e.to_string()))?;
        decode_prediction(parsed)
    }
}

fn decode_prediction(response: PredictResponse) -> Result<CoverImage, GenError> {
    // Imagen drops filtered images from `predictions` entirely.
    let prediction = response
        .predictions
        .into_iter()
        .next()
        .ok_or_else(|| GenError::Blocked("no image returned for this prompt".into()))?;

    let Some(encoded) = prediction.bytes_base64_encoded else {
        let reason = prediction
            .rai_filtered_reason
            .unwrap_or_else(|| "image missing from prediction".into());
        return Err(GenError::Blocked(reason));
    };

    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| GenError::Decode(format!("base64: {e}")))?;
    if bytes.is_empty() {
        return Err(GenError::Empty);
    }
    Ok(CoverImage {
        bytes: bytes.into(),
        mime_type: prediction.mime_type.unwrap_or_else(|| "image/png".into()),
    })
}
