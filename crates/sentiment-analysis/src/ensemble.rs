use chrono::Utc;
use signal_core::stats::clamp;
use signal_core::{ImpactTimeline, SentimentRecord};
use std::sync::Arc;

use crate::classifier::SentimentClassifier;
use crate::providers::{LlmProvider, ProviderReply};

/// Explanation stored when no LLM contributed to a record.
pub const CLASSIFIER_ONLY_EXPLANATION: &str = "FinBERT analysis";

#[derive(Debug, Clone, Copy)]
pub struct EnsembleConfig {
    pub classifier_weight: f64,
    pub llm_weight: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            classifier_weight: 0.4,
            llm_weight: 0.6,
        }
    }
}

/// Blend the two components. Each is `(score, confidence)`.
///
/// Both present: weighted score, mean confidence. One present: used as is.
/// Neither: `(0.0, 0.0)`.
pub fn combine_scores(
    classifier: Option<(f64, f64)>,
    llm: Option<(f64, f64)>,
    config: &EnsembleConfig,
) -> (f64, f64) {
    let (score, confidence) = match (classifier, llm) {
        (Some((c_score, c_conf)), Some((l_score, l_conf))) => (
            config.classifier_weight * c_score + config.llm_weight * l_score,
            (c_conf + l_conf) / 2.0,
        ),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => (0.0, 0.0),
    };
    (clamp(score, -1.0, 1.0), clamp(confidence, 0.0, 1.0))
}

/// Classifier plus an ordered chain of LLM providers.
pub struct SentimentEnsemble {
    classifier: SentimentClassifier,
    providers: Vec<Arc<dyn LlmProvider>>,
    config: EnsembleConfig,
}

impl SentimentEnsemble {
    pub fn new(classifier: SentimentClassifier, providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self::with_config(classifier, providers, EnsembleConfig::default())
    }

    pub fn with_config(
        classifier: SentimentClassifier,
        providers: Vec<Arc<dyn LlmProvider>>,
        config: EnsembleConfig,
    ) -> Self {
        Self {
            classifier,
            providers,
            config,
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Score one article. Upstream failures degrade; this never errors.
    pub async fn analyze(&self, article_id: i64, text: &str, context: &str) -> SentimentRecord {
        let classified = self.classifier.analyze(text).await;
        let reply = self.first_llm_reply(article_id, text, context).await;

        let llm_component = reply
            .as_ref()
            .map(|r| (r.analysis.sentiment_score, r.analysis.confidence));
        let (score, confidence) = combine_scores(
            Some((classified.score, classified.confidence)),
            llm_component,
            &self.config,
        );

        let (explanation, impact_timeline) = match &reply {
            Some(r) if !r.analysis.explanation.is_empty() => {
                (r.analysis.explanation.clone(), r.analysis.impact_timeline)
            }
            Some(r) => (
                CLASSIFIER_ONLY_EXPLANATION.to_string(),
                r.analysis.impact_timeline,
            ),
            None => (
                CLASSIFIER_ONLY_EXPLANATION.to_string(),
                ImpactTimeline::Unknown,
            ),
        };

        tracing::info!(
            article_id,
            score,
            confidence,
            provider = reply.as_ref().map(|r| r.provider.as_str()).unwrap_or("none"),
            "Ensemble sentiment computed"
        );

        SentimentRecord {
            article_id,
            sentiment_score: score,
            confidence,
            explanation,
            impact_timeline,
            classifier_score: Some(classified.score),
            llm_score: llm_component.map(|(s, _)| s),
            llm_provider: reply.as_ref().map(|r| r.provider.clone()),
            raw_response: reply.map(|r| r.raw),
            analyzed_at: Utc::now(),
        }
    }

    /// First provider that answers with a valid reply. Unconfigured providers
    /// are skipped; failures fall through to the next one.
    async fn first_llm_reply(&self, article_id: i64, text: &str, context: &str) -> Option<ProviderReply> {
        for provider in &self.providers {
            if !provider.is_configured() {
                tracing::debug!("Skipping {}: no API keys", provider.name());
                continue;
            }
            match provider.attempt(text, context).await {
                Ok(reply) => return Some(reply),
                Err(e) => {
                    tracing::warn!(
                        "{} analysis failed for article {}: {}",
                        provider.name(),
                        article_id,
                        e
                    );
                }
            }
        }
        None
    }
}
