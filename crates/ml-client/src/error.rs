use thiserror::Error;

#[derive(Error, Debug)]
pub enum MLError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    #[error("No API keys configured")]
    NoKeysConfigured,

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MLError {
    /// The key itself was refused and should leave the rotation.
    pub fn is_key_failure(&self) -> bool {
        matches!(self, MLError::Unauthorized(_))
    }

    /// Configuration mistakes must surface instead of degrading.
    pub fn is_configuration(&self) -> bool {
        matches!(self, MLError::NoKeysConfigured)
    }
}

pub type MLResult<T> = Result<T, MLError>;
