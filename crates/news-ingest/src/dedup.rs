//! Deduplication ledger: URL, content hash, then fuzzy title similarity.
//!
//! All "known" state comes from the [`ContentLedger`] on every check; nothing is
//! cached here, so concurrent workers see each other's inserts.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use signal_core::{ContentLedger, PipelineResult};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Similarity ratio at or above which two titles are the same story
    pub fuzzy_threshold: f64,
    /// How far back recent titles are considered
    pub fuzzy_window: Duration,
    /// Upper bound on titles compared per check
    pub fuzzy_max_titles: i64,
    pub fuzzy_enabled: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.85,
            fuzzy_window: Duration::minutes(180),
            fuzzy_max_titles: 200,
            fuzzy_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DedupDecision {
    Admit { content_hash: String },
    DuplicateUrl,
    DuplicateContent { content_hash: String },
    NearDuplicate { matched_title: String, similarity: f64 },
}

impl DedupDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, DedupDecision::Admit { .. })
    }

    pub fn reason(&self) -> &'static str {
        match self {
            DedupDecision::Admit { .. } => "admitted",
            DedupDecision::DuplicateUrl => "duplicate url",
            DedupDecision::DuplicateContent { .. } => "duplicate content",
            DedupDecision::NearDuplicate { .. } => "near-duplicate title",
        }
    }
}

/// Lowercased, trimmed, with internal whitespace runs collapsed to one space.
pub fn normalize_for_hash(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// SHA-256 hex digest of the normalized text. Case and whitespace insensitive.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(normalize_for_hash(text).as_bytes());
    hex::encode(digest)
}

/// Hash identifying an article's content across sources: title + summary.
pub fn article_content_hash(title: &str, summary: Option<&str>) -> String {
    match summary {
        Some(summary) => content_hash(&format!("{} {}", title, summary)),
        None => content_hash(title),
    }
}

/// Normalized similarity ratio in [0, 1] between two titles, case-insensitive.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

/// Most similar existing title at or above `threshold`, as `(index, ratio)`.
pub fn best_title_match<S: AsRef<str>>(title: &str, existing: &[S], threshold: f64) -> Option<(usize, f64)> {
    existing
        .iter()
        .enumerate()
        .map(|(i, other)| (i, title_similarity(title, other.as_ref())))
        .filter(|(_, ratio)| *ratio >= threshold)
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn is_fuzzy_duplicate<S: AsRef<str>>(title: &str, existing: &[S], threshold: f64) -> bool {
    best_title_match(title, existing, threshold).is_some()
}

pub struct Deduplicator {
    ledger: Arc<dyn ContentLedger>,
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(ledger: Arc<dyn ContentLedger>, config: DedupConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Decide admission for a candidate. Runs the cheap gates first and stops at
    /// the first hit.
    pub async fn check(&self, url: &str, title: &str, summary: Option<&str>) -> PipelineResult<DedupDecision> {
        if self.ledger.url_exists(url).await? {
            tracing::debug!("Rejecting {}: url already known", url);
            return Ok(DedupDecision::DuplicateUrl);
        }

        let content_hash = article_content_hash(title, summary);
        if self.ledger.content_hash_exists(&content_hash).await? {
            tracing::debug!("Rejecting {}: content hash {} already known", url, content_hash);
            return Ok(DedupDecision::DuplicateContent { content_hash });
        }

        if self.config.fuzzy_enabled {
            let since = Utc::now() - self.config.fuzzy_window;
            let recent = self
                .ledger
                .recent_titles(since, self.config.fuzzy_max_titles)
                .await?;
            if let Some((idx, similarity)) = best_title_match(title, &recent, self.config.fuzzy_threshold) {
                tracing::debug!(
                    "Rejecting {}: title {:.3} similar to \"{}\"",
                    url,
                    similarity,
                    recent[idx]
                );
                return Ok(DedupDecision::NearDuplicate {
                    matched_title: recent[idx].clone(),
                    similarity,
                });
            }
        }

        Ok(DedupDecision::Admit { content_hash })
    }
}
