use anyhow::{Context, Result};
use news_ingest::IngestOutcome;
use signal_core::RawArticle;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub rejected: usize,
    pub invalid: usize,
    /// Lines that were not a valid article record
    pub malformed: usize,
}

/// Admit a JSON-lines file of raw articles, one record per line.
pub async fn ingest_file(ctx: &crate::context::PipelineContext, path: &Path) -> Result<IngestReport> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    ingest_lines(ctx, BufReader::new(file)).await
}

/// Records are admitted in order, so a later line that repeats an earlier one
/// is rejected as a duplicate.
pub async fn ingest_lines<R>(ctx: &crate::context::PipelineContext, reader: R) -> Result<IngestReport>
where
    R: AsyncBufRead + Unpin,
{
    let mut report = IngestReport::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("reading article records")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawArticle = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Line {}: not an article record: {}", line_no, e);
                report.malformed += 1;
                continue;
            }
        };

        match ctx.ingestor.ingest(raw).await? {
            IngestOutcome::Inserted(_) => report.inserted += 1,
            IngestOutcome::Rejected(_) => report.rejected += 1,
            IngestOutcome::Invalid(reason) => {
                tracing::warn!("Line {}: {}", line_no, reason);
                report.invalid += 1;
            }
        }
    }

    tracing::info!(
        "Ingest done: {} inserted, {} duplicates, {} invalid, {} malformed",
        report.inserted,
        report.rejected,
        report.invalid,
        report.malformed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::memory_context;

    const FEED: &str = r#"
{"title": "Infosys wins $1.5bn deal", "url": "https://et.example/i1", "source": "Economic Times", "published_at": "2026-10-19T08:00:00Z", "body_text": "Infosys signed a large deal.\nAlso Read: Top gainers"}
{"title": "Infosys wins $1.5bn deal", "url": "https://et.example/i1", "source": "Economic Times", "published_at": "2026-10-19T08:00:00Z"}
{"title": "Infosys wins $1.5 bn deal", "url": "https://mint.example/x", "source": "Mint", "published_at": "2026-10-19T08:05:00Z"}
{"title": "", "url": "https://et.example/empty", "source": "Economic Times", "published_at": "2026-10-19T08:00:00Z"}
not json
{"title": "RBI holds repo rate", "url": "https://mc.example/r1", "source": "Moneycontrol", "published_at": "2026-10-19T09:00:00Z", "summary": "<p>Policy &amp; outlook</p>"}
"#;

    #[tokio::test]
    async fn test_ingest_lines_counts_outcomes() {
        let (ctx, sink) = memory_context().await;
        let report = ingest_lines(&ctx, FEED.as_bytes()).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                inserted: 2,
                rejected: 2,
                invalid: 1,
                malformed: 1,
            }
        );
        assert_eq!(sink.published().len(), 2);
        assert!(sink.published().iter().all(|(channel, _)| channel == "feed"));

        // Body text is cleaned on the way in and queues the article for sentiment.
        let pending = ctx.db.articles_pending_sentiment(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        let article = ctx.db.article(pending[0]).await.unwrap().unwrap();
        assert_eq!(article.full_text.as_deref(), Some("Infosys signed a large deal."));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (ctx, _sink) = memory_context().await;
        let err = ingest_file(&ctx, Path::new("/nonexistent/feed.jsonl")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/feed.jsonl"));
    }
}
