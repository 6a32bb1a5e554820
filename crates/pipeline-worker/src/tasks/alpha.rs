use alpha_metrics::AlphaOutcome;
use anyhow::{Context, Result};
use news_ingest::{TRACKED_SECTORS, TRACKED_UNIVERSE};
use notification_service::PipelineEvent;
use signal_core::AlphaScope;
use std::sync::Arc;

use crate::context::PipelineContext;
use crate::queue::BatchReport;

/// Every tracked stock, then every tracked sector.
pub fn alpha_scopes() -> Vec<AlphaScope> {
    TRACKED_UNIVERSE
        .iter()
        .map(|e| AlphaScope::Stock(e.ticker.to_string()))
        .chain(TRACKED_SECTORS.iter().map(|s| AlphaScope::Sector(s.to_string())))
        .collect()
}

/// Compute one snapshot and announce it on the scope's channel.
pub async fn compute_scope(ctx: &PipelineContext, scope: AlphaScope) -> Result<AlphaOutcome> {
    let target = &scope;
    let outcome = ctx
        .retry
        .run("compute alpha", move || async move { ctx.engine.compute(target).await })
        .await
        .with_context(|| format!("computing alpha for {}", scope))?;

    if let AlphaOutcome::Recorded(metric) = &outcome {
        ctx.notifier.notify(&PipelineEvent::alpha(metric)).await;
    }
    Ok(outcome)
}

pub async fn sweep(ctx: &Arc<PipelineContext>) -> Result<BatchReport> {
    let scopes = alpha_scopes();
    tracing::info!("Dispatching {} alpha metric tasks", scopes.len());

    let report = ctx
        .queue
        .run_batch("alpha", scopes, |scope| {
            let ctx = Arc::clone(ctx);
            async move { compute_scope(&ctx, scope).await }
        })
        .await;
    Ok(report)
}
