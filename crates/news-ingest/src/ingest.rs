use chrono::Utc;
use notification_service::{Notifier, PipelineEvent};
use signal_core::{Article, ArticleStore, ContentLedger, NewArticle, PipelineResult, RawArticle};
use std::sync::Arc;

use crate::dedup::{DedupConfig, DedupDecision, Deduplicator};
use crate::text_cleaner::{clean_article_text, clean_html};

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Inserted(Article),
    Rejected(DedupDecision),
    Invalid(String),
}

impl IngestOutcome {
    pub fn article_id(&self) -> Option<i64> {
        match self {
            IngestOutcome::Inserted(article) => Some(article.id),
            _ => None,
        }
    }
}

/// Admission of normalized articles from ingestion collaborators.
///
/// Deduplication runs synchronously inside [`ingest`](Self::ingest), before the
/// article exists anywhere downstream work could pick it up.
pub struct Ingestor {
    dedup: Deduplicator,
    store: Arc<dyn ArticleStore>,
    notifier: Notifier,
}

impl Ingestor {
    pub fn new(
        ledger: Arc<dyn ContentLedger>,
        store: Arc<dyn ArticleStore>,
        notifier: Notifier,
        config: DedupConfig,
    ) -> Self {
        Self {
            dedup: Deduplicator::new(ledger, config),
            store,
            notifier,
        }
    }

    pub async fn ingest(&self, raw: RawArticle) -> PipelineResult<IngestOutcome> {
        let url = raw.url.trim().to_string();
        let title = clean_html(&raw.title);
        if url.is_empty() {
            return Ok(IngestOutcome::Invalid("missing url".to_string()));
        }
        if title.is_empty() {
            return Ok(IngestOutcome::Invalid(format!("missing title for {}", url)));
        }

        let summary = raw
            .summary
            .as_deref()
            .map(clean_html)
            .filter(|s| !s.is_empty());

        let decision = self.dedup.check(&url, &title, summary.as_deref()).await?;
        let content_hash = match decision {
            DedupDecision::Admit { content_hash } => content_hash,
            rejected => {
                tracing::info!("Skipping {} ({})", url, rejected.reason());
                return Ok(IngestOutcome::Rejected(rejected));
            }
        };

        let full_text = raw
            .body_text
            .as_deref()
            .map(clean_article_text)
            .filter(|t| !t.is_empty());

        let new_article = NewArticle {
            url,
            title,
            summary,
            full_text,
            source: raw.source,
            published_at: raw.published_at,
            scraped_at: Utc::now(),
            content_hash,
            category: raw.category,
        };

        let Some(id) = self.store.insert_article(&new_article).await? else {
            // Lost an insert race on the URL.
            return Ok(IngestOutcome::Rejected(DedupDecision::DuplicateUrl));
        };

        let article = Article {
            id,
            url: new_article.url,
            title: new_article.title,
            summary: new_article.summary,
            full_text: new_article.full_text,
            source: new_article.source,
            published_at: new_article.published_at,
            scraped_at: new_article.scraped_at,
            content_hash: new_article.content_hash,
            category: new_article.category,
        };

        tracing::info!(article_id = id, source = %article.source, "Article ingested");
        self.notifier.notify(&PipelineEvent::new_article(&article)).await;
        Ok(IngestOutcome::Inserted(article))
    }

    /// Store scraped full text for an article. Empty text after cleaning is
    /// ignored.
    pub async fn attach_full_text(&self, article_id: i64, text: &str) -> PipelineResult<bool> {
        let cleaned = clean_article_text(text);
        if cleaned.is_empty() {
            tracing::debug!("Article {}: scraped text empty after cleaning", article_id);
            return Ok(false);
        }
        self.store.attach_full_text(article_id, &cleaned).await
    }
}
