use signal_core::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value no longer parses into its domain type.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => PipelineError::Database(e.to_string()),
            StoreError::Serialization(e) => PipelineError::InvalidData(e.to_string()),
            StoreError::Corrupt(msg) => PipelineError::InvalidData(msg),
            StoreError::NotFound(msg) => PipelineError::NotFound(msg),
        }
    }
}
