use anyhow::{Context, Result};
use signal_core::PipelineError;
use std::sync::Arc;

use crate::context::PipelineContext;
use crate::queue::BatchReport;

/// Resolve the companies an article talks about and store one mention per
/// tracked ticker. Returns how many new mentions were written.
pub async fn tag_article(ctx: &PipelineContext, article_id: i64) -> Result<usize> {
    let article = ctx
        .retry
        .run("load article", move || async move {
            ctx.db.article(article_id).await.map_err(PipelineError::from)
        })
        .await
        .with_context(|| format!("loading article {}", article_id))?;
    let Some(article) = article else {
        tracing::warn!("Article not found: {}", article_id);
        return Ok(0);
    };

    let full_text = article.full_text.as_deref().unwrap_or_default();
    let mentions = ctx.tagger.tag(article_id, &article.title, full_text);

    let mut written = 0;
    for mention in &mentions {
        let inserted = ctx
            .retry
            .run("save mention", move || async move {
                ctx.db.insert_mention_row(mention).await.map_err(PipelineError::from)
            })
            .await
            .with_context(|| format!("saving mention {} for article {}", mention.ticker, article_id))?;
        if inserted {
            written += 1;
        }
    }

    ctx.db
        .mark_tickers_scanned(article_id)
        .await
        .with_context(|| format!("marking article {} scanned", article_id))?;

    if written > 0 {
        let tickers: Vec<&str> = mentions.iter().map(|m| m.ticker.as_str()).collect();
        tracing::info!("Article {} mentions {}", article_id, tickers.join(", "));
    }
    Ok(written)
}

/// Submit one unit per article with text that has never been scanned.
pub async fn sweep(ctx: &Arc<PipelineContext>) -> Result<BatchReport> {
    let pending = ctx
        .db
        .articles_pending_tickers(ctx.config.pending_batch_size)
        .await
        .context("listing articles pending ticker extraction")?;
    tracing::info!("Dispatching {} ticker extraction tasks", pending.len());

    let report = ctx
        .queue
        .run_batch("tickers", pending, |article_id| {
            let ctx = Arc::clone(ctx);
            async move { tag_article(&ctx, article_id).await }
        })
        .await;
    Ok(report)
}
