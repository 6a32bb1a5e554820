use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::{AlphaMetric, AlphaScope, Article, ImpactTimeline, SentimentRecord, Signal};

/// Events published to real-time consumers. Serializes as
/// `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PipelineEvent {
    NewArticle {
        id: i64,
        title: String,
        source: String,
        url: String,
        published_at: DateTime<Utc>,
    },
    SentimentUpdate {
        article_id: i64,
        sentiment_score: f64,
        confidence: f64,
        explanation: String,
        impact_timeline: ImpactTimeline,
        classifier_score: Option<f64>,
        llm_score: Option<f64>,
        llm_provider: Option<String>,
        analyzed_at: DateTime<Utc>,
    },
    StockUpdate(AlphaPayload),
    SectorUpdate(AlphaPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaPayload {
    /// Set on stock updates
    pub ticker: Option<String>,
    /// Set on sector updates
    pub sector: Option<String>,
    pub window_hours: i64,
    pub expectation_gap: f64,
    pub narrative_velocity: f64,
    pub divergence: f64,
    pub composite_score: f64,
    pub signal: Signal,
    pub conviction: f64,
    pub computed_at: DateTime<Utc>,
}

impl AlphaPayload {
    /// Ticker or sector name, whichever scope the snapshot covers.
    pub fn entity(&self) -> &str {
        self.ticker.as_deref().or(self.sector.as_deref()).unwrap_or_default()
    }
}

impl PipelineEvent {
    pub fn new_article(article: &Article) -> Self {
        PipelineEvent::NewArticle {
            id: article.id,
            title: article.title.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            published_at: article.published_at,
        }
    }

    pub fn sentiment(record: &SentimentRecord) -> Self {
        PipelineEvent::SentimentUpdate {
            article_id: record.article_id,
            sentiment_score: record.sentiment_score,
            confidence: record.confidence,
            explanation: record.explanation.clone(),
            impact_timeline: record.impact_timeline,
            classifier_score: record.classifier_score,
            llm_score: record.llm_score,
            llm_provider: record.llm_provider.clone(),
            analyzed_at: record.analyzed_at,
        }
    }

    pub fn alpha(metric: &AlphaMetric) -> Self {
        let (ticker, sector) = match &metric.scope {
            AlphaScope::Stock(ticker) => (Some(ticker.clone()), None),
            AlphaScope::Sector(sector) => (None, Some(sector.clone())),
        };
        let payload = AlphaPayload {
            ticker,
            sector,
            window_hours: metric.window_hours,
            expectation_gap: metric.expectation_gap,
            narrative_velocity: metric.narrative_velocity,
            divergence: metric.divergence,
            composite_score: metric.composite_score,
            signal: metric.signal,
            conviction: metric.conviction,
            computed_at: metric.computed_at,
        };
        match metric.scope {
            AlphaScope::Stock(_) => PipelineEvent::StockUpdate(payload),
            AlphaScope::Sector(_) => PipelineEvent::SectorUpdate(payload),
        }
    }

    /// Pub/sub channel the event belongs on.
    pub fn channel(&self) -> String {
        match self {
            PipelineEvent::NewArticle { .. } => "feed".to_string(),
            PipelineEvent::SentimentUpdate { .. } => "sentiment".to_string(),
            PipelineEvent::StockUpdate(p) => format!("stock:{}", p.entity()),
            PipelineEvent::SectorUpdate(p) => format!("sector:{}", p.entity()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::NewArticle { .. } => "new_article",
            PipelineEvent::SentimentUpdate { .. } => "sentiment_update",
            PipelineEvent::StockUpdate(_) => "stock_update",
            PipelineEvent::SectorUpdate(_) => "sector_update",
        }
    }
}
