use thiserror::Error;

/// Errors produced by calls to the generative AI service.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("response did not match the expected schema: {0}")]
    Schema(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("Gemini API key is not configured. Set GEMINI_API_KEY in the environment")]
    MissingCredential,
}

impl GenAiError {
    /// True for failures caused by a missing or rejected credential.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            GenAiError::MissingCredential | GenAiError::Api { status: 401 | 403, .. }
        )
    }
}
