use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::signal::unix::SignalKind;
use tokio::task::JoinHandle;
use tokio::time;

mod config;
mod context;
mod queue;
mod retry;
mod tasks;

use config::PipelineConfig;
use context::PipelineContext;
use queue::BatchReport;

#[derive(Debug, Default)]
struct CliArgs {
    ingest: Vec<PathBuf>,
    once: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ingest" => match args.next() {
                Some(path) => parsed.ingest.push(PathBuf::from(path)),
                None => bail!("--ingest requires a file path"),
            },
            "--once" => parsed.once = true,
            "--help" | "-h" => {
                println!("Usage: pipeline-worker [--ingest <articles.jsonl>]... [--once]");
                println!();
                println!("  --ingest <file>  Admit JSON-lines article records before scheduling");
                println!("  --once           Run one ticker, sentiment and alpha pass, then exit");
                std::process::exit(0);
            }
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let args = parse_args()?;
    tracing::info!("Starting AlphaStream pipeline worker");

    let config = PipelineConfig::from_env()?;
    tracing::info!("Configuration loaded and validated");
    tracing::info!("  Database: {}", config.database_url);
    tracing::info!(
        "  Scan intervals: tickers {}s, sentiment {}s, alpha {}s",
        config.ticker_scan_interval_secs,
        config.sentiment_scan_interval_secs,
        config.alpha_scan_interval_secs
    );
    tracing::info!(
        "  Alpha window: {}h against a {}d baseline",
        config.alpha_window_hours,
        config.alpha_baseline_days
    );
    tracing::info!("  Max concurrent tasks: {}", config.max_concurrent_tasks);

    let ctx = PipelineContext::build(config).await?;
    tracing::info!("Event sink: {}", ctx.notifier.publisher_name());

    for path in &args.ingest {
        let report = tasks::ingest::ingest_file(&ctx, path).await?;
        tracing::info!("{}: {} new articles", path.display(), report.inserted);
    }

    if args.once {
        run_once(&ctx).await;
        return Ok(());
    }

    run_scheduler(ctx).await
}

/// One pass of every stage in dependency order: tagging feeds sentiment
/// scoping, sentiment feeds alpha.
async fn run_once(ctx: &Arc<PipelineContext>) {
    log_sweep("tickers", tasks::tickers::sweep(ctx).await);
    log_sweep("sentiment", tasks::sentiment::sweep(ctx).await);
    log_sweep("alpha", tasks::alpha::sweep(ctx).await);
}

fn log_sweep(label: &str, result: Result<BatchReport>) {
    if let Err(e) = result {
        tracing::error!("{} sweep failed: {:#}", label, e);
    }
}

/// Start a sweep in the background unless the previous one is still running.
fn spawn_sweep<F, Fut>(label: &'static str, slot: &mut Option<JoinHandle<()>>, ctx: &Arc<PipelineContext>, sweep: F)
where
    F: FnOnce(Arc<PipelineContext>) -> Fut,
    Fut: Future<Output = Result<BatchReport>> + Send + 'static,
{
    if slot.as_ref().is_some_and(|h| !h.is_finished()) {
        tracing::info!("{} sweep still running, skipping this tick", label);
        return;
    }
    let unit = sweep(Arc::clone(ctx));
    *slot = Some(tokio::spawn(async move { log_sweep(label, unit.await) }));
}

async fn run_scheduler(ctx: Arc<PipelineContext>) -> Result<()> {
    let mut ticker_tick = time::interval(Duration::from_secs(ctx.config.ticker_scan_interval_secs));
    let mut sentiment_tick = time::interval(Duration::from_secs(ctx.config.sentiment_scan_interval_secs));
    let mut alpha_tick = time::interval(Duration::from_secs(ctx.config.alpha_scan_interval_secs));
    for tick in [&mut ticker_tick, &mut sentiment_tick, &mut alpha_tick] {
        tick.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    }

    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM");
            }
        }
    };
    tokio::pin!(shutdown);

    let mut tickers_running: Option<JoinHandle<()>> = None;
    let mut sentiment_running: Option<JoinHandle<()>> = None;
    let mut alpha_running: Option<JoinHandle<()>> = None;

    tracing::info!("Scheduler started");
    loop {
        tokio::select! {
            _ = ticker_tick.tick() => {
                spawn_sweep("tickers", &mut tickers_running, &ctx, |ctx| async move {
                    tasks::tickers::sweep(&ctx).await
                });
            }
            _ = sentiment_tick.tick() => {
                spawn_sweep("sentiment", &mut sentiment_running, &ctx, |ctx| async move {
                    tasks::sentiment::sweep(&ctx).await
                });
            }
            _ = alpha_tick.tick() => {
                spawn_sweep("alpha", &mut alpha_running, &ctx, |ctx| async move {
                    tasks::alpha::sweep(&ctx).await
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, waiting for running sweeps...");
                break;
            }
        }
    }

    for handle in [tickers_running, sentiment_running, alpha_running].into_iter().flatten() {
        if let Err(e) = handle.await {
            tracing::error!("Sweep task ended abnormally: {}", e);
        }
    }
    tracing::info!("Pipeline worker stopped");
    Ok(())
}
