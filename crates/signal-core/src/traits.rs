use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AlphaMetric, AlphaScope, Article, NewArticle, PipelineResult, StockMention};

/// What the deduplication ledger needs to know about already-admitted content.
/// Backed by the article table; nothing is cached by the core.
#[async_trait]
pub trait ContentLedger: Send + Sync {
    async fn url_exists(&self, url: &str) -> PipelineResult<bool>;

    async fn content_hash_exists(&self, content_hash: &str) -> PipelineResult<bool>;

    /// Titles of articles scraped after `since`, newest first, at most `limit`.
    async fn recent_titles(&self, since: DateTime<Utc>, limit: i64) -> PipelineResult<Vec<String>>;
}

/// Article and mention writes used by ingestion and tagging.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article. `Ok(None)` when another worker inserted the same
    /// URL first.
    async fn insert_article(&self, article: &NewArticle) -> PipelineResult<Option<i64>>;

    async fn get_article(&self, article_id: i64) -> PipelineResult<Option<Article>>;

    /// The one allowed mutation of an article. Returns false when the article
    /// does not exist.
    async fn attach_full_text(&self, article_id: i64, full_text: &str) -> PipelineResult<bool>;

    /// Insert unless a mention for (article, ticker) already exists or the
    /// ticker is not tracked. Returns whether a row was written.
    async fn insert_mention(&self, mention: &StockMention) -> PipelineResult<bool>;
}

/// Rolling-window reads and snapshot writes used by the alpha engine.
#[async_trait]
pub trait AlphaDataSource: Send + Sync {
    /// Sentiment scores of distinct articles mentioning the scope, analyzed after `since`.
    async fn sentiment_scores(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<Vec<f64>>;

    /// Distinct articles mentioning the scope, scraped after `since`.
    async fn mentioned_article_count(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<i64>;

    /// All distinct articles scraped after `since`.
    async fn article_count(&self, since: DateTime<Utc>) -> PipelineResult<i64>;

    /// Tickers belonging to a sector, in stable order.
    async fn sector_tickers(&self, sector: &str) -> PipelineResult<Vec<String>>;

    async fn stock_exists(&self, ticker: &str) -> PipelineResult<bool>;

    /// Append a snapshot. Never updates an earlier row.
    async fn record_alpha_metric(&self, metric: &AlphaMetric) -> PipelineResult<i64>;
}

/// Market-data collaborator.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fractional close-to-close move over the last `lookback_sessions` sessions.
    /// `Ok(None)` means the data exists but is too short to compute a move.
    async fn price_change_fraction(&self, ticker: &str, lookback_sessions: u32) -> PipelineResult<Option<f64>>;
}

/// Named-entity collaborator: organization mentions in free text.
pub trait EntityExtractor: Send + Sync {
    fn extract_organizations(&self, text: &str) -> Vec<String>;
}
