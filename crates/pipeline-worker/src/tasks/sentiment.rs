use anyhow::{Context, Result};
use notification_service::PipelineEvent;
use signal_core::{PipelineError, SentimentRecord};
use std::sync::Arc;

use crate::context::PipelineContext;
use crate::queue::BatchReport;

#[derive(Debug)]
pub enum SentimentTaskOutcome {
    Recorded(SentimentRecord),
    NoText,
    Missing,
}

/// Score one article and store its sentiment record, replacing any earlier
/// one. Upstream model failures degrade inside the ensemble; only persistence
/// is retried.
pub async fn analyze_article(ctx: &PipelineContext, article_id: i64) -> Result<SentimentTaskOutcome> {
    let article = ctx
        .retry
        .run("load article", move || async move {
            ctx.db.article(article_id).await.map_err(PipelineError::from)
        })
        .await
        .with_context(|| format!("loading article {}", article_id))?;
    let Some(article) = article else {
        tracing::warn!("Article not found: {}", article_id);
        return Ok(SentimentTaskOutcome::Missing);
    };

    let Some(text) = article.full_text.as_deref().filter(|t| !t.trim().is_empty()) else {
        tracing::info!("Article has no full_text: {}", article_id);
        return Ok(SentimentTaskOutcome::NoText);
    };

    let context = format!("source: {}", article.source);
    let record = ctx.ensemble.analyze(article_id, text, &context).await;

    let pending = &record;
    ctx.retry
        .run("save sentiment", move || async move {
            ctx.db.save_sentiment(pending).await.map_err(PipelineError::from)
        })
        .await
        .with_context(|| format!("saving sentiment for article {}", article_id))?;

    ctx.notifier.notify(&PipelineEvent::sentiment(&record)).await;
    Ok(SentimentTaskOutcome::Recorded(record))
}

/// Submit one unit per article that has text and no sentiment yet.
pub async fn sweep(ctx: &Arc<PipelineContext>) -> Result<BatchReport> {
    let pending = ctx
        .db
        .articles_pending_sentiment(ctx.config.pending_batch_size)
        .await
        .context("listing articles pending sentiment")?;
    tracing::info!("Dispatching {} sentiment analysis tasks", pending.len());

    let report = ctx
        .queue
        .run_batch("sentiment", pending, |article_id| {
            let ctx = Arc::clone(ctx);
            async move { analyze_article(&ctx, article_id).await }
        })
        .await;
    Ok(report)
}
