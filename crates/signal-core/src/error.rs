use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Deployment mistake (missing keys, bad settings). Never degraded silently.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PipelineError {
    /// Persistence failures are the only class the scheduler retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Database(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
