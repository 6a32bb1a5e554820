use regex::Regex;
use signal_core::{EntityExtractor, ImpactDirection, StockMention};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::ticker_resolver::TickerResolver;
use crate::universe::{UniverseEntry, TRACKED_UNIVERSE};

/// Relevance recorded for every mention found at ingestion time.
pub const MENTION_RELEVANCE: f64 = 0.8;

/// Aliases this short only match with their exact casing ("ITC", "BoB").
const CASE_SENSITIVE_MAX_LEN: usize = 4;

static EXPLICIT_TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\$|\bNSE:\s?)([A-Z][A-Z0-9&-]{1,11})").expect("valid ticker pattern")
});

/// Tickers written out explicitly as `$TICKER` or `NSE:TICKER`, in order of
/// appearance, without repeats.
pub fn explicit_tickers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EXPLICIT_TICKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(['-', '&']).to_string())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Entity extractor that scans for whole-word occurrences of known aliases.
/// Longer aliases take precedence where they overlap.
pub struct AliasScanExtractor {
    pattern: Option<Regex>,
}

impl AliasScanExtractor {
    pub fn new() -> Self {
        Self::from_entries(TRACKED_UNIVERSE)
    }

    pub fn from_entries(entries: &[UniverseEntry]) -> Self {
        let mut aliases: Vec<&str> = entries
            .iter()
            .flat_map(|e| e.aliases.iter().copied())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        aliases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        aliases.dedup();

        if aliases.is_empty() {
            return Self { pattern: None };
        }

        let alternatives: Vec<String> = aliases
            .iter()
            .map(|alias| {
                if alias.chars().count() <= CASE_SENSITIVE_MAX_LEN {
                    regex::escape(alias)
                } else {
                    format!("(?i:{})", regex::escape(alias))
                }
            })
            .collect();
        let source = format!(r"\b(?:{})\b", alternatives.join("|"));

        match Regex::new(&source) {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(e) => {
                tracing::error!("Alias scan pattern failed to compile: {}", e);
                Self { pattern: None }
            }
        }
    }
}

impl Default for AliasScanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for AliasScanExtractor {
    fn extract_organizations(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .filter(|m| seen.insert(m.to_lowercase()))
            .collect()
    }
}

/// Turns article text into stock mentions: extracted entities first, then
/// explicit ticker patterns.
pub struct TickerTagger {
    resolver: TickerResolver,
    extractor: Arc<dyn EntityExtractor>,
    tracked: HashSet<String>,
}

impl TickerTagger {
    pub fn new(resolver: TickerResolver, extractor: Arc<dyn EntityExtractor>) -> Self {
        let tracked = TRACKED_UNIVERSE
            .iter()
            .map(|e| e.ticker.to_string())
            .collect();
        Self {
            resolver,
            extractor,
            tracked,
        }
    }

    /// One mention per distinct tracked ticker. `mentioned_as` is the first
    /// entity that resolved to the ticker, or the ticker itself when only the
    /// explicit pattern matched.
    pub fn tag(&self, article_id: i64, title: &str, full_text: &str) -> Vec<StockMention> {
        let combined = format!("{} {}", title, full_text);
        let organizations = self.extractor.extract_organizations(&combined);

        let mut mentions: Vec<StockMention> = Vec::new();
        let mut push = |ticker: &str, mentioned_as: &str| {
            if !self.tracked.contains(ticker) || mentions.iter().any(|m| m.ticker == ticker) {
                return;
            }
            mentions.push(StockMention {
                article_id,
                ticker: ticker.to_string(),
                relevance_score: MENTION_RELEVANCE,
                mentioned_as: mentioned_as.to_string(),
                impact_direction: ImpactDirection::Neutral,
            });
        };

        for resolution in self.resolver.resolve_all(organizations.as_slice()) {
            if let Some(ticker) = &resolution.ticker {
                push(ticker, &resolution.entity);
            }
        }
        for ticker in explicit_tickers(&combined) {
            push(&ticker, &ticker);
        }

        tracing::debug!(
            "Article {}: {} entities, {} tickers",
            article_id,
            organizations.len(),
            mentions.len()
        );
        mentions
    }
}
