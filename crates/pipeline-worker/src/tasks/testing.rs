//! Shared fixtures for task tests: an in-memory store, a recording event sink
//! and scripted model and market collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ml_client::{CompletionTransport, KeyRotator, MLResult, RateLimiter};
use notification_service::{MemoryPublisher, Notifier};
use sentiment_analysis::{KeyedProvider, LlmProvider, SentimentClassifier, SentimentEnsemble};
use signal_core::{MarketDataProvider, NewArticle, PipelineResult};
use signal_store::SignalDb;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::context::PipelineContext;

pub(crate) struct ScriptedTransport(pub String);

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _api_key: &str, _prompt: &str) -> MLResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub(crate) struct FixedMarket(pub HashMap<String, f64>);

#[async_trait]
impl MarketDataProvider for FixedMarket {
    async fn price_change_fraction(&self, ticker: &str, _lookback_sessions: u32) -> PipelineResult<Option<f64>> {
        Ok(self.0.get(ticker).copied())
    }
}

pub(crate) fn test_config() -> PipelineConfig {
    PipelineConfig {
        database_url: "sqlite::memory:".to_string(),
        task_retry_delay_ms: 1,
        ..Default::default()
    }
}

pub(crate) fn classifier_only_ensemble() -> SentimentEnsemble {
    SentimentEnsemble::new(SentimentClassifier::Unavailable, Vec::new())
}

/// Ensemble whose single provider always answers with `reply`.
pub(crate) fn keyed_ensemble(reply: &str) -> SentimentEnsemble {
    let provider: Arc<dyn LlmProvider> = Arc::new(KeyedProvider::new(
        Arc::new(ScriptedTransport(reply.to_string())),
        Arc::new(RateLimiter::new(NonZeroU32::new(6000).unwrap())),
        Arc::new(KeyRotator::new(vec!["test-key".to_string()])),
    ));
    SentimentEnsemble::new(SentimentClassifier::Unavailable, vec![provider])
}

pub(crate) async fn context_full(
    ensemble: SentimentEnsemble,
    market: FixedMarket,
) -> (Arc<PipelineContext>, Arc<MemoryPublisher>) {
    let db = SignalDb::new("sqlite::memory:").await.unwrap();
    db.seed_stocks(&news_ingest::tracked_stocks()).await.unwrap();
    let sink = Arc::new(MemoryPublisher::new());
    let ctx = PipelineContext::new(
        test_config(),
        db,
        Notifier::new(sink.clone()),
        ensemble,
        Arc::new(market),
    );
    (Arc::new(ctx), sink)
}

pub(crate) async fn context_with(ensemble: SentimentEnsemble) -> (Arc<PipelineContext>, Arc<MemoryPublisher>) {
    context_full(ensemble, FixedMarket::default()).await
}

pub(crate) async fn memory_context() -> (Arc<PipelineContext>, Arc<MemoryPublisher>) {
    context_with(classifier_only_ensemble()).await
}

pub(crate) async fn insert_article_at(
    ctx: &PipelineContext,
    url: &str,
    title: &str,
    full_text: Option<&str>,
    scraped_at: DateTime<Utc>,
) -> i64 {
    ctx.db
        .insert_article_row(&NewArticle {
            url: url.to_string(),
            title: title.to_string(),
            summary: None,
            full_text: full_text.map(str::to_string),
            source: "Economic Times".to_string(),
            published_at: scraped_at,
            scraped_at,
            content_hash: news_ingest::article_content_hash(title, None),
            category: None,
        })
        .await
        .unwrap()
        .expect("new url")
}

pub(crate) async fn insert_article(ctx: &PipelineContext, url: &str, title: &str, full_text: Option<&str>) -> i64 {
    insert_article_at(ctx, url, title, full_text, Utc::now()).await
}
