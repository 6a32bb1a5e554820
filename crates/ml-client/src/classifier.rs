use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MLError, MLResult};

/// Characters of input the classifier model accepts.
pub const CLASSIFIER_MAX_CHARS: usize = 512;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierPrediction {
    /// One of `positive`, `negative`, `neutral`
    pub label: String,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierResponse {
    pub predictions: Vec<ClassifierPrediction>,
    #[serde(default)]
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ClassifierRequest {
    texts: Vec<String>,
    use_cache: bool,
}

/// HTTP client for the FinBERT-style financial sentiment service.
#[derive(Clone)]
pub struct FinbertClient {
    client: reqwest::Client,
    base_url: String,
}

impl FinbertClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> MLResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify one text. Input is cut to the model's context size.
    pub async fn classify(&self, text: &str) -> MLResult<ClassifierPrediction> {
        let truncated: String = text.chars().take(CLASSIFIER_MAX_CHARS).collect();
        let request = ClassifierRequest {
            texts: vec![truncated],
            use_cache: true,
        };

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MLError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response.json::<ClassifierResponse>().await?;
        body.predictions
            .into_iter()
            .next()
            .ok_or_else(|| MLError::InvalidResponse("empty predictions".to_string()))
    }

    /// Check service health
    pub async fn health(&self) -> MLResult<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
