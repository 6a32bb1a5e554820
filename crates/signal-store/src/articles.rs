use async_trait::async_trait;
use chrono::{DateTime, Utc};
use signal_core::{Article, ArticleStore, ContentLedger, NewArticle, PipelineResult, StockMention};

use crate::db::SignalDb;
use crate::error::StoreResult;

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    url: String,
    title: String,
    summary: Option<String>,
    full_text: Option<String>,
    source: String,
    published_at: DateTime<Utc>,
    scraped_at: DateTime<Utc>,
    content_hash: String,
    category: Option<String>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            url: row.url,
            title: row.title,
            summary: row.summary,
            full_text: row.full_text,
            source: row.source,
            published_at: row.published_at,
            scraped_at: row.scraped_at,
            content_hash: row.content_hash,
            category: row.category,
        }
    }
}

impl SignalDb {
    /// Insert an article unless its URL is already stored.
    pub async fn insert_article_row(&self, article: &NewArticle) -> StoreResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO news_articles
                (url, title, summary, full_text, source, published_at, scraped_at, content_hash, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.summary)
        .bind(&article.full_text)
        .bind(&article.source)
        .bind(article.published_at)
        .bind(article.scraped_at)
        .bind(&article.content_hash)
        .bind(&article.category)
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    pub async fn article(&self, article_id: i64) -> StoreResult<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>("SELECT * FROM news_articles WHERE id = ?")
            .bind(article_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(Article::from))
    }

    /// Fill in the body of an article that has none yet. Returns false when
    /// the article is unknown or already carries text.
    pub async fn set_full_text(&self, article_id: i64, full_text: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE news_articles SET full_text = ? WHERE id = ? AND (full_text IS NULL OR full_text = '')",
        )
        .bind(full_text)
        .bind(article_id)
        .execute(self.pool())
        .await?;

        let written = result.rows_affected() > 0;
        if !written {
            tracing::debug!("Full text not attached to article {}", article_id);
        }
        Ok(written)
    }

    /// Write a mention unless it exists already or the ticker is not tracked.
    pub async fn insert_mention_row(&self, mention: &StockMention) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO article_stock_mentions
                (article_id, stock_id, relevance_score, mentioned_as, impact_direction)
            SELECT ?, id, ?, ?, ? FROM stocks WHERE ticker = ? AND is_active = 1
            ON CONFLICT(article_id, stock_id) DO NOTHING
            "#,
        )
        .bind(mention.article_id)
        .bind(mention.relevance_score)
        .bind(&mention.mentioned_as)
        .bind(mention.impact_direction.as_str())
        .bind(&mention.ticker)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tickers mentioned by an article, in insertion order.
    pub async fn mentioned_tickers(&self, article_id: i64) -> StoreResult<Vec<String>> {
        let tickers = sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.ticker FROM article_stock_mentions asm
            JOIN stocks s ON s.id = asm.stock_id
            WHERE asm.article_id = ?
            ORDER BY asm.id
            "#,
        )
        .bind(article_id)
        .fetch_all(self.pool())
        .await?;

        Ok(tickers)
    }

    pub async fn mark_tickers_scanned(&self, article_id: i64) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO ticker_scans (article_id, scanned_at) VALUES (?, ?) ON CONFLICT(article_id) DO NOTHING",
        )
        .bind(article_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Articles with full text and no sentiment record, newest first.
    pub async fn articles_pending_sentiment(&self, limit: i64) -> StoreResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT a.id FROM news_articles a
            LEFT JOIN sentiment_analyses sa ON sa.article_id = a.id
            WHERE sa.id IS NULL AND a.full_text IS NOT NULL AND a.full_text <> ''
            ORDER BY a.scraped_at DESC, a.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(ids)
    }

    /// Articles with full text that the tagger has not scanned, newest first.
    pub async fn articles_pending_tickers(&self, limit: i64) -> StoreResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT a.id FROM news_articles a
            WHERE a.full_text IS NOT NULL AND a.full_text <> ''
              AND NOT EXISTS (SELECT 1 FROM ticker_scans ts WHERE ts.article_id = a.id)
              AND NOT EXISTS (SELECT 1 FROM article_stock_mentions asm WHERE asm.article_id = a.id)
            ORDER BY a.scraped_at DESC, a.id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(ids)
    }
}

#[async_trait]
impl ContentLedger for SignalDb {
    async fn url_exists(&self, url: &str) -> PipelineResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM news_articles WHERE url = ? LIMIT 1")
            .bind(url)
            .fetch_optional(self.pool())
            .await
            .map_err(crate::StoreError::from)?;
        Ok(found.is_some())
    }

    async fn content_hash_exists(&self, content_hash: &str) -> PipelineResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM news_articles WHERE content_hash = ? LIMIT 1")
            .bind(content_hash)
            .fetch_optional(self.pool())
            .await
            .map_err(crate::StoreError::from)?;
        Ok(found.is_some())
    }

    async fn recent_titles(&self, since: DateTime<Utc>, limit: i64) -> PipelineResult<Vec<String>> {
        let titles = sqlx::query_scalar::<_, String>(
            "SELECT title FROM news_articles WHERE scraped_at > ? ORDER BY scraped_at DESC LIMIT ?",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(crate::StoreError::from)?;
        Ok(titles)
    }
}

#[async_trait]
impl ArticleStore for SignalDb {
    async fn insert_article(&self, article: &NewArticle) -> PipelineResult<Option<i64>> {
        Ok(self.insert_article_row(article).await?)
    }

    async fn get_article(&self, article_id: i64) -> PipelineResult<Option<Article>> {
        Ok(self.article(article_id).await?)
    }

    async fn attach_full_text(&self, article_id: i64, full_text: &str) -> PipelineResult<bool> {
        Ok(self.set_full_text(article_id, full_text).await?)
    }

    async fn insert_mention(&self, mention: &StockMention) -> PipelineResult<bool> {
        Ok(self.insert_mention_row(mention).await?)
    }
}
