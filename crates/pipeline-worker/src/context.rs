use anyhow::{Context, Result};
use std::sync::Arc;

use alpha_metrics::AlphaEngine;
use market_data::YahooChartClient;
use ml_client::{GeminiTransport, KeyRotator, OpenRouterTransport, RateLimiter};
use news_ingest::{tracked_stocks, AliasScanExtractor, Ingestor, TickerResolver, TickerTagger};
use notification_service::Notifier;
use sentiment_analysis::{any_configured, KeyedProvider, LlmProvider, SentimentClassifier, SentimentEnsemble};
use signal_core::MarketDataProvider;
use signal_store::SignalDb;

use crate::config::PipelineConfig;
use crate::queue::TaskQueue;
use crate::retry::RetryPolicy;

/// Everything a unit of work needs, built once and shared by all tasks.
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub db: SignalDb,
    pub notifier: Notifier,
    pub ensemble: SentimentEnsemble,
    pub tagger: TickerTagger,
    pub engine: AlphaEngine,
    pub ingestor: Ingestor,
    pub retry: RetryPolicy,
    pub queue: TaskQueue,
}

impl PipelineContext {
    /// Connect to the store and event sink and construct the model clients.
    pub async fn build(config: PipelineConfig) -> Result<Arc<Self>> {
        let db = SignalDb::new(&config.database_url)
            .await
            .with_context(|| format!("opening database {}", config.database_url))?;
        db.seed_stocks(&tracked_stocks())
            .await
            .context("seeding tracked stocks")?;

        let notifier = Notifier::from_redis_url(config.redis_url.as_deref()).await;
        let ensemble = build_ensemble(&config)?;
        let market: Arc<dyn MarketDataProvider> = Arc::new(YahooChartClient::new(config.http_timeout()));

        Ok(Arc::new(Self::new(config, db, notifier, ensemble, market)))
    }

    pub fn new(
        config: PipelineConfig,
        db: SignalDb,
        notifier: Notifier,
        ensemble: SentimentEnsemble,
        market: Arc<dyn MarketDataProvider>,
    ) -> Self {
        let store = Arc::new(db.clone());
        let tagger = TickerTagger::new(TickerResolver::new(), Arc::new(AliasScanExtractor::new()));
        let engine = AlphaEngine::new(store.clone(), market, config.alpha_config());
        let ingestor = Ingestor::new(store.clone(), store, notifier.clone(), config.dedup_config());
        let retry = RetryPolicy::new(config.task_max_retries, config.retry_delay());
        let queue = TaskQueue::new(config.max_concurrent_tasks);

        Self {
            config,
            db,
            notifier,
            ensemble,
            tagger,
            engine,
            ingestor,
            retry,
            queue,
        }
    }
}

/// Gemini first, then OpenRouter. Each provider gets its own limiter and key
/// pool, shared by every task that calls it.
fn build_ensemble(config: &PipelineConfig) -> Result<SentimentEnsemble> {
    let ml = config.ml_config();

    let gemini = GeminiTransport::new(ml.gemini_model.clone(), ml.timeout).context("building Gemini client")?;
    let openrouter =
        OpenRouterTransport::new(ml.openrouter_model.clone(), ml.timeout).context("building OpenRouter client")?;

    let providers: Vec<Arc<dyn LlmProvider>> = vec![
        Arc::new(KeyedProvider::new(
            Arc::new(gemini),
            Arc::new(RateLimiter::new(ml.requests_per_minute)),
            Arc::new(KeyRotator::new(config.gemini_api_keys.clone())),
        )),
        Arc::new(KeyedProvider::new(
            Arc::new(openrouter),
            Arc::new(RateLimiter::new(ml.requests_per_minute)),
            Arc::new(KeyRotator::new(config.openrouter_api_keys.clone())),
        )),
    ];

    if any_configured(&providers) {
        tracing::info!(
            "LLM providers: gemini ({} keys), openrouter ({} keys)",
            config.gemini_api_keys.len(),
            config.openrouter_api_keys.len()
        );
    } else {
        tracing::warn!("No LLM API keys configured; sentiment will be classifier-only");
    }

    let classifier = SentimentClassifier::from_url(ml.classifier_url.as_deref(), ml.timeout);
    Ok(SentimentEnsemble::new(classifier, providers))
}
