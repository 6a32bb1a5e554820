use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized output of an ingestion collaborator (RSS, Reddit, scrapers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Stored article. `url` is globally unique; `content_hash` is derived from the
/// normalized title + summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub full_text: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
    pub content_hash: String,
    pub category: Option<String>,
}

/// Article about to be inserted.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub summary: Option<String>,
    pub full_text: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub scraped_at: DateTime<Utc>,
    pub content_hash: String,
    pub category: Option<String>,
}

/// Directional tag on a stock mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImpactDirection {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl ImpactDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactDirection::Bullish => "bullish",
            ImpactDirection::Bearish => "bearish",
            ImpactDirection::Neutral => "neutral",
        }
    }
}

impl FromStr for ImpactDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Ok(ImpactDirection::Bullish),
            "bearish" => Ok(ImpactDirection::Bearish),
            "neutral" => Ok(ImpactDirection::Neutral),
            other => Err(format!("unknown impact direction: {}", other)),
        }
    }
}

/// Edge from an article to a tracked stock. At most one per (article, ticker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMention {
    pub article_id: i64,
    pub ticker: String,
    pub relevance_score: f64,
    pub mentioned_as: String,
    pub impact_direction: ImpactDirection,
}

/// When the market is expected to react to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTimeline {
    Immediate,
    ShortTerm,
    LongTerm,
    #[default]
    Unknown,
}

impl ImpactTimeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactTimeline::Immediate => "immediate",
            ImpactTimeline::ShortTerm => "short_term",
            ImpactTimeline::LongTerm => "long_term",
            ImpactTimeline::Unknown => "unknown",
        }
    }

    /// Lenient parse: accepts `short_term`, `short-term` and `short term`.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "immediate" => Some(ImpactTimeline::Immediate),
            "short_term" => Some(ImpactTimeline::ShortTerm),
            "long_term" => Some(ImpactTimeline::LongTerm),
            "unknown" | "" => Some(ImpactTimeline::Unknown),
            _ => None,
        }
    }
}

impl FromStr for ImpactTimeline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImpactTimeline::parse_lenient(s).ok_or_else(|| format!("unknown impact timeline: {}", s))
    }
}

/// Ensemble sentiment result. Exactly zero or one per article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub article_id: i64,
    /// Ensemble score in [-1.0, 1.0]
    pub sentiment_score: f64,
    /// Ensemble confidence in [0.0, 1.0]
    pub confidence: f64,
    pub explanation: String,
    pub impact_timeline: ImpactTimeline,
    pub classifier_score: Option<f64>,
    pub llm_score: Option<f64>,
    pub llm_provider: Option<String>,
    /// Opaque provider payload kept for audit
    pub raw_response: Option<serde_json::Value>,
    pub analyzed_at: DateTime<Utc>,
}

/// Discrete trading recommendation derived from a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "strong_buy",
            Signal::Buy => "buy",
            Signal::Hold => "hold",
            Signal::Sell => "sell",
            Signal::StrongSell => "strong_sell",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strong_buy" => Ok(Signal::StrongBuy),
            "buy" => Ok(Signal::Buy),
            "hold" => Ok(Signal::Hold),
            "sell" => Ok(Signal::Sell),
            "strong_sell" => Ok(Signal::StrongSell),
            other => Err(format!("unknown signal: {}", other)),
        }
    }
}

/// What an alpha snapshot describes: one stock or one whole sector, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "name", rename_all = "snake_case")]
pub enum AlphaScope {
    Stock(String),
    Sector(String),
}

impl AlphaScope {
    pub fn name(&self) -> &str {
        match self {
            AlphaScope::Stock(ticker) => ticker,
            AlphaScope::Sector(sector) => sector,
        }
    }

    pub fn ticker(&self) -> Option<&str> {
        match self {
            AlphaScope::Stock(ticker) => Some(ticker),
            AlphaScope::Sector(_) => None,
        }
    }

    pub fn sector(&self) -> Option<&str> {
        match self {
            AlphaScope::Stock(_) => None,
            AlphaScope::Sector(sector) => Some(sector),
        }
    }
}

impl fmt::Display for AlphaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphaScope::Stock(ticker) => write!(f, "stock {}", ticker),
            AlphaScope::Sector(sector) => write!(f, "sector {}", sector),
        }
    }
}

/// One computed signal snapshot. Rows accumulate; the latest is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaMetric {
    pub scope: AlphaScope,
    pub window_hours: i64,
    pub expectation_gap: f64,
    pub narrative_velocity: f64,
    pub divergence: f64,
    pub composite_score: f64,
    pub signal: Signal,
    pub conviction: f64,
    pub computed_at: DateTime<Utc>,
}

/// Member of the tracked stock universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedStock {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_round_trip_strings() {
        for signal in [
            Signal::StrongBuy,
            Signal::Buy,
            Signal::Hold,
            Signal::Sell,
            Signal::StrongSell,
        ] {
            assert_eq!(signal.as_str().parse::<Signal>().unwrap(), signal);
        }
        assert!("maybe".parse::<Signal>().is_err());
    }

    #[test]
    fn test_impact_timeline_lenient() {
        assert_eq!(ImpactTimeline::parse_lenient("Short-Term"), Some(ImpactTimeline::ShortTerm));
        assert_eq!(ImpactTimeline::parse_lenient("long term"), Some(ImpactTimeline::LongTerm));
        assert_eq!(ImpactTimeline::parse_lenient("immediate"), Some(ImpactTimeline::Immediate));
        assert_eq!(ImpactTimeline::parse_lenient("next quarter"), None);
    }

    #[test]
    fn test_scope_accessors() {
        let stock = AlphaScope::Stock("TCS".to_string());
        assert_eq!(stock.ticker(), Some("TCS"));
        assert_eq!(stock.sector(), None);

        let sector = AlphaScope::Sector("FMCG".to_string());
        assert_eq!(sector.ticker(), None);
        assert_eq!(sector.sector(), Some("FMCG"));
        assert_eq!(sector.to_string(), "sector FMCG");
    }

    #[test]
    fn test_signal_serializes_snake_case() {
        let json = serde_json::to_string(&Signal::StrongSell).unwrap();
        assert_eq!(json, "\"strong_sell\"");
    }
}
