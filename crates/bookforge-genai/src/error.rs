use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("request failed: {0}")]
    Http(String),

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The provider refused the prompt (safety filters and the like).
    #[error("generation blocked: {0}")]
    Blocked(String),

    #[error("provider returned no output")]
    Empty,

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GenError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GenError::Decode(e.to_string())
        } else {
            GenError::Http(e.to_string())
        }
    }
}
