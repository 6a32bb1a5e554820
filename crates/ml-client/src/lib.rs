pub mod classifier;
pub mod error;
pub mod llm;
pub mod rate_limiter;

pub use classifier::{ClassifierPrediction, FinbertClient, CLASSIFIER_MAX_CHARS};
pub use error::{MLError, MLResult};
pub use llm::{CompletionTransport, GeminiTransport, OpenRouterTransport};
pub use rate_limiter::{key_suffix, KeyRotator, RateLimiter};

use std::num::NonZeroU32;
use std::time::Duration;

/// Connection settings for the model services.
#[derive(Debug, Clone)]
pub struct MLConfig {
    /// Financial classifier service; `None` when it is not deployed.
    pub classifier_url: Option<String>,
    pub gemini_model: String,
    pub openrouter_model: String,
    pub requests_per_minute: NonZeroU32,
    pub timeout: Duration,
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            classifier_url: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            openrouter_model: "google/gemini-2.0-flash-001".to_string(),
            requests_per_minute: NonZeroU32::new(15).unwrap_or(NonZeroU32::MIN),
            timeout: Duration::from_secs(30),
        }
    }
}
