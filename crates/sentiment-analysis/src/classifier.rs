use async_trait::async_trait;
use ml_client::{ClassifierPrediction, FinbertClient, MLResult};
use std::sync::Arc;
use std::time::Duration;

/// A loaded financial-sentiment model.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn predict(&self, text: &str) -> MLResult<ClassifierPrediction>;
}

#[async_trait]
impl SentimentModel for FinbertClient {
    async fn predict(&self, text: &str) -> MLResult<ClassifierPrediction> {
        self.classify(text).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOutput {
    /// +1.0 positive, -1.0 negative, 0.0 neutral
    pub score: f64,
    pub confidence: f64,
    pub label: String,
}

impl ClassifierOutput {
    /// Zero-score stub used whenever the model cannot answer.
    pub fn neutral_stub() -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            label: "neutral".to_string(),
        }
    }
}

/// Map a classifier label onto the sentiment axis.
pub fn label_score(label: &str) -> f64 {
    match label.trim().to_lowercase().as_str() {
        "positive" => 1.0,
        "negative" => -1.0,
        _ => 0.0,
    }
}

/// Classifier capability, decided once at construction.
#[derive(Clone)]
pub enum SentimentClassifier {
    Available(Arc<dyn SentimentModel>),
    Unavailable,
}

impl SentimentClassifier {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        SentimentClassifier::Available(model)
    }

    /// Build from an optional service URL. No URL, or a client that cannot be
    /// built, yields the unavailable variant.
    pub fn from_url(url: Option<&str>, timeout: Duration) -> Self {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            tracing::warn!("No classifier URL configured, classifier unavailable");
            return SentimentClassifier::Unavailable;
        };
        match FinbertClient::new(url, timeout) {
            Ok(client) => {
                tracing::info!("Classifier available at {}", client.base_url());
                SentimentClassifier::Available(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("Classifier client could not be built: {}", e);
                SentimentClassifier::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SentimentClassifier::Available(_))
    }

    /// Never fails: an unavailable model or a failed call gives the neutral stub.
    pub async fn analyze(&self, text: &str) -> ClassifierOutput {
        let model = match self {
            SentimentClassifier::Available(model) => model,
            SentimentClassifier::Unavailable => return ClassifierOutput::neutral_stub(),
        };

        match model.predict(text).await {
            Ok(prediction) => ClassifierOutput {
                score: label_score(&prediction.label),
                confidence: signal_core::stats::clamp(prediction.confidence, 0.0, 1.0),
                label: prediction.label.to_lowercase(),
            },
            Err(e) => {
                tracing::warn!("Classifier call failed, using neutral stub: {}", e);
                ClassifierOutput::neutral_stub()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_client::MLError;

    struct FixedModel(&'static str, f64);

    #[async_trait]
    impl SentimentModel for FixedModel {
        async fn predict(&self, _text: &str) -> MLResult<ClassifierPrediction> {
            Ok(ClassifierPrediction {
                label: self.0.to_string(),
                positive: 0.0,
                negative: 0.0,
                neutral: 0.0,
                confidence: self.1,
            })
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl SentimentModel for BrokenModel {
        async fn predict(&self, _text: &str) -> MLResult<ClassifierPrediction> {
            Err(MLError::ModelNotLoaded)
        }
    }

    #[test]
    fn test_label_score() {
        assert_eq!(label_score("positive"), 1.0);
        assert_eq!(label_score("Negative"), -1.0);
        assert_eq!(label_score("neutral"), 0.0);
        assert_eq!(label_score("other"), 0.0);
    }

    #[tokio::test]
    async fn test_available_maps_label() {
        let classifier = SentimentClassifier::new(Arc::new(FixedModel("negative", 0.87)));
        let out = classifier.analyze("Losses widen").await;
        assert_eq!(out.score, -1.0);
        assert_eq!(out.confidence, 0.87);
        assert_eq!(out.label, "negative");
    }

    #[tokio::test]
    async fn test_unavailable_returns_stub() {
        let classifier = SentimentClassifier::from_url(None, Duration::from_secs(1));
        assert!(!classifier.is_available());
        assert_eq!(classifier.analyze("anything").await, ClassifierOutput::neutral_stub());
    }

    #[tokio::test]
    async fn test_runtime_failure_returns_stub() {
        let classifier = SentimentClassifier::new(Arc::new(BrokenModel));
        assert!(classifier.is_available());
        assert_eq!(classifier.analyze("anything").await, ClassifierOutput::neutral_stub());
    }
}
