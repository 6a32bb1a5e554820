use chrono::{DateTime, Duration, Utc};
use signal_core::stats::mean;
use signal_core::{AlphaDataSource, AlphaMetric, AlphaScope, MarketDataProvider, PipelineResult};
use std::sync::Arc;

use crate::composite::combine;
use crate::metrics::{divergence, expectation_gap, narrative_velocity, news_share};

#[derive(Debug, Clone)]
pub struct AlphaEngineConfig {
    /// Length of the "current" window
    pub window_hours: i64,
    /// Length of the trailing baseline window, which includes the current one
    pub baseline_days: i64,
    pub price_lookback_sessions: u32,
    /// Constituents sampled for a sector's average price move
    pub sector_price_sample: usize,
}

impl Default for AlphaEngineConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            baseline_days: 7,
            price_lookback_sessions: 5,
            sector_price_sample: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AlphaOutcome {
    /// A snapshot was computed and appended.
    Recorded(AlphaMetric),
    /// No sentiment inside the current window; nothing was written.
    NoData,
    /// The ticker is not tracked, or the sector has no constituents.
    UnknownEntity,
}

impl AlphaOutcome {
    pub fn metric(&self) -> Option<&AlphaMetric> {
        match self {
            AlphaOutcome::Recorded(metric) => Some(metric),
            _ => None,
        }
    }
}

/// Intermediate values behind one snapshot, kept for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricInputs {
    pub current_mean: f64,
    pub baseline_mean: f64,
    pub news_share: f64,
    pub price_change: f64,
}

/// Computes expectation gap, narrative velocity and divergence for one stock or
/// sector and appends the resulting snapshot.
///
/// Every call is independent: nothing is read back from earlier snapshots, so
/// a rerun only adds another row.
pub struct AlphaEngine {
    source: Arc<dyn AlphaDataSource>,
    market: Arc<dyn MarketDataProvider>,
    config: AlphaEngineConfig,
}

impl AlphaEngine {
    pub fn new(
        source: Arc<dyn AlphaDataSource>,
        market: Arc<dyn MarketDataProvider>,
        config: AlphaEngineConfig,
    ) -> Self {
        Self {
            source,
            market,
            config,
        }
    }

    pub fn config(&self) -> &AlphaEngineConfig {
        &self.config
    }

    pub async fn compute(&self, scope: &AlphaScope) -> PipelineResult<AlphaOutcome> {
        self.compute_at(scope, Utc::now()).await
    }

    /// Same as [`compute`](Self::compute) with an explicit clock.
    pub async fn compute_at(&self, scope: &AlphaScope, now: DateTime<Utc>) -> PipelineResult<AlphaOutcome> {
        let tickers = match scope {
            AlphaScope::Stock(ticker) => {
                if !self.source.stock_exists(ticker).await? {
                    tracing::warn!("Alpha skipped: {} is not a tracked stock", ticker);
                    return Ok(AlphaOutcome::UnknownEntity);
                }
                vec![ticker.clone()]
            }
            AlphaScope::Sector(sector) => {
                let tickers = self.source.sector_tickers(sector).await?;
                if tickers.is_empty() {
                    tracing::debug!("Alpha skipped: sector {} has no stocks", sector);
                    return Ok(AlphaOutcome::UnknownEntity);
                }
                tickers
            }
        };

        let Some(inputs) = self.gather_inputs(scope, &tickers, now).await? else {
            tracing::debug!("Alpha skipped: no recent sentiment for {}", scope);
            return Ok(AlphaOutcome::NoData);
        };

        let metric = self.build_metric(scope, &inputs, now);
        self.source.record_alpha_metric(&metric).await?;

        tracing::info!(
            scope = %scope,
            composite = metric.composite_score,
            signal = %metric.signal,
            "Alpha computed: EG={:.4} NV={:.4} DIV={:.4}",
            metric.expectation_gap,
            metric.narrative_velocity,
            metric.divergence
        );
        Ok(AlphaOutcome::Recorded(metric))
    }

    async fn gather_inputs(
        &self,
        scope: &AlphaScope,
        tickers: &[String],
        now: DateTime<Utc>,
    ) -> PipelineResult<Option<MetricInputs>> {
        let window_start = now - Duration::hours(self.config.window_hours);
        let baseline_start = now - Duration::days(self.config.baseline_days);

        let current = self.source.sentiment_scores(scope, window_start).await?;
        let Some(current_mean) = mean(&current) else {
            return Ok(None);
        };

        let baseline = self.source.sentiment_scores(scope, baseline_start).await?;
        let baseline_mean = mean(&baseline).unwrap_or(0.0);

        let mentioned = self.source.mentioned_article_count(scope, window_start).await?;
        let total = self.source.article_count(window_start).await?;

        let price_change = match scope {
            AlphaScope::Stock(ticker) => self.price_change(ticker).await.unwrap_or(0.0),
            AlphaScope::Sector(_) => self.sector_price_change(tickers).await,
        };

        Ok(Some(MetricInputs {
            current_mean,
            baseline_mean,
            news_share: news_share(mentioned, total),
            price_change,
        }))
    }

    fn build_metric(&self, scope: &AlphaScope, inputs: &MetricInputs, now: DateTime<Utc>) -> AlphaMetric {
        let eg = expectation_gap(inputs.current_mean, inputs.baseline_mean);
        let nv = narrative_velocity(inputs.news_share, inputs.current_mean);
        let div = divergence(inputs.current_mean, inputs.price_change);
        let composite = combine(eg, nv, div);

        AlphaMetric {
            scope: scope.clone(),
            window_hours: self.config.window_hours,
            expectation_gap: eg,
            narrative_velocity: nv,
            divergence: div,
            composite_score: composite.composite_score,
            signal: composite.signal,
            conviction: composite.conviction,
            computed_at: now,
        }
    }

    /// Price move for one ticker. Provider failures are logged and reported as
    /// `None`; they never abort the computation.
    async fn price_change(&self, ticker: &str) -> Option<f64> {
        match self
            .market
            .price_change_fraction(ticker, self.config.price_lookback_sessions)
            .await
        {
            Ok(Some(change)) if change.is_finite() => Some(change),
            Ok(_) => {
                tracing::warn!("Price data for {} too short, using 0.0", ticker);
                None
            }
            Err(e) => {
                tracing::warn!("Price fetch failed for {}: {}", ticker, e);
                None
            }
        }
    }

    /// Mean move across the first sampled constituents. Missing and flat moves
    /// are left out of the average.
    async fn sector_price_change(&self, tickers: &[String]) -> f64 {
        let mut changes = Vec::new();
        for ticker in tickers.iter().take(self.config.sector_price_sample) {
            if let Some(change) = self.price_change(ticker).await {
                if change != 0.0 {
                    changes.push(change);
                }
            }
        }
        mean(&changes).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signal_core::{PipelineError, Signal};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeArticle {
        scraped_at: DateTime<Utc>,
        tickers: Vec<&'static str>,
        sentiment: Option<(f64, DateTime<Utc>)>,
    }

    struct FakeSource {
        sectors: Vec<(&'static str, &'static str)>,
        articles: Vec<FakeArticle>,
        recorded: Mutex<Vec<AlphaMetric>>,
    }

    impl FakeSource {
        fn new(articles: Vec<FakeArticle>) -> Self {
            Self {
                sectors: vec![
                    ("TCS", "IT"),
                    ("INFY", "IT"),
                    ("WIPRO", "IT"),
                    ("HDFCBANK", "Banking"),
                ],
                articles,
                recorded: Mutex::new(Vec::new()),
            }
        }

        fn in_scope(&self, article: &FakeArticle, scope: &AlphaScope) -> bool {
            article.tickers.iter().any(|t| match scope {
                AlphaScope::Stock(ticker) => t == ticker,
                AlphaScope::Sector(sector) => self
                    .sectors
                    .iter()
                    .any(|(ticker, s)| ticker == t && s == sector),
            })
        }
    }

    #[async_trait]
    impl AlphaDataSource for FakeSource {
        async fn sentiment_scores(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<Vec<f64>> {
            Ok(self
                .articles
                .iter()
                .filter(|a| self.in_scope(a, scope))
                .filter_map(|a| a.sentiment)
                .filter(|(_, at)| *at > since)
                .map(|(score, _)| score)
                .collect())
        }

        async fn mentioned_article_count(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<i64> {
            Ok(self
                .articles
                .iter()
                .filter(|a| a.scraped_at > since && self.in_scope(a, scope))
                .count() as i64)
        }

        async fn article_count(&self, since: DateTime<Utc>) -> PipelineResult<i64> {
            Ok(self.articles.iter().filter(|a| a.scraped_at > since).count() as i64)
        }

        async fn sector_tickers(&self, sector: &str) -> PipelineResult<Vec<String>> {
            Ok(self
                .sectors
                .iter()
                .filter(|(_, s)| *s == sector)
                .map(|(t, _)| t.to_string())
                .collect())
        }

        async fn stock_exists(&self, ticker: &str) -> PipelineResult<bool> {
            Ok(self.sectors.iter().any(|(t, _)| *t == ticker))
        }

        async fn record_alpha_metric(&self, metric: &AlphaMetric) -> PipelineResult<i64> {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.push(metric.clone());
            Ok(recorded.len() as i64)
        }
    }

    #[derive(Default)]
    struct FakeMarket {
        changes: HashMap<&'static str, PipelineResult<Option<f64>>>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeMarket {
        async fn price_change_fraction(&self, ticker: &str, lookback_sessions: u32) -> PipelineResult<Option<f64>> {
            self.calls
                .lock()
                .unwrap()
                .push((ticker.to_string(), lookback_sessions));
            match self.changes.get(ticker) {
                Some(Ok(change)) => Ok(*change),
                Some(Err(e)) => Err(PipelineError::Upstream(e.to_string())),
                None => Ok(None),
            }
        }
    }

    fn hours_ago(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
        now - Duration::hours(hours)
    }

    fn article(at: DateTime<Utc>, tickers: Vec<&'static str>, score: Option<f64>) -> FakeArticle {
        FakeArticle {
            scraped_at: at,
            tickers,
            sentiment: score.map(|s| (s, at)),
        }
    }

    /// One fresh TCS article at +0.8, two older ones averaging the week to
    /// +0.3, and nine unrelated fresh articles for a 10% news share.
    fn scenario(now: DateTime<Utc>) -> Vec<FakeArticle> {
        let mut articles = vec![
            article(hours_ago(now, 2), vec!["TCS"], Some(0.8)),
            article(hours_ago(now, 72), vec!["TCS"], Some(-0.2)),
            article(hours_ago(now, 120), vec!["TCS"], Some(0.3)),
        ];
        for _ in 0..9 {
            articles.push(article(hours_ago(now, 3), vec![], None));
        }
        articles
    }

    fn engine(source: Arc<FakeSource>, market: Arc<FakeMarket>) -> AlphaEngine {
        AlphaEngine::new(source, market, AlphaEngineConfig::default())
    }

    #[tokio::test]
    async fn test_stock_scenario() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(scenario(now)));
        let market = Arc::new(FakeMarket {
            changes: HashMap::from([("TCS", Ok(Some(-0.05)))]),
            ..Default::default()
        });

        let outcome = engine(source.clone(), market.clone())
            .compute_at(&AlphaScope::Stock("TCS".to_string()), now)
            .await
            .unwrap();
        let metric = outcome.metric().expect("recorded");

        assert!((metric.expectation_gap - 0.5).abs() < 1e-9);
        assert!((metric.narrative_velocity - 0.9).abs() < 1e-9);
        assert!((metric.divergence - 0.85).abs() < 1e-9);
        assert!((metric.composite_score - 0.7075).abs() < 1e-9);
        assert_eq!(metric.signal, Signal::StrongBuy);
        assert_eq!(metric.conviction, metric.composite_score);
        assert!(metric.conviction < 1.0);
        assert_eq!(metric.window_hours, 24);

        assert_eq!(source.recorded.lock().unwrap().len(), 1);
        assert_eq!(*market.calls.lock().unwrap(), vec![("TCS".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_no_recent_sentiment_writes_nothing() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(vec![
            article(hours_ago(now, 48), vec!["TCS"], Some(0.6)),
            article(hours_ago(now, 1), vec!["TCS"], None),
        ]));
        let outcome = engine(source.clone(), Arc::new(FakeMarket::default()))
            .compute_at(&AlphaScope::Stock("TCS".to_string()), now)
            .await
            .unwrap();
        assert!(matches!(outcome, AlphaOutcome::NoData));
        assert!(source.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_valued_row_still_written() {
        let now = Utc::now();
        // Neutral sentiment, flat price: a real row of zeros except velocity.
        let source = Arc::new(FakeSource::new(vec![article(hours_ago(now, 1), vec!["INFY"], Some(0.0))]));
        let outcome = engine(source.clone(), Arc::new(FakeMarket::default()))
            .compute_at(&AlphaScope::Stock("INFY".to_string()), now)
            .await
            .unwrap();
        let metric = outcome.metric().expect("recorded");
        assert_eq!(metric.expectation_gap, 0.0);
        assert_eq!(metric.divergence, 0.0);
        assert_eq!(metric.narrative_velocity, 5.0);
        assert_eq!(source.recorded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_price_failure_degrades_to_zero() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(vec![article(hours_ago(now, 1), vec!["TCS"], Some(0.4))]));
        let market = Arc::new(FakeMarket {
            changes: HashMap::from([("TCS", Err(PipelineError::Upstream("timeout".to_string())))]),
            ..Default::default()
        });
        let outcome = engine(source, market)
            .compute_at(&AlphaScope::Stock("TCS".to_string()), now)
            .await
            .unwrap();
        let metric = outcome.metric().expect("recorded");
        assert!((metric.divergence - 0.4).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_unknown_stock_and_empty_sector() {
        let source = Arc::new(FakeSource::new(Vec::new()));
        let engine = engine(source.clone(), Arc::new(FakeMarket::default()));
        let outcome = engine.compute(&AlphaScope::Stock("NOPE".to_string())).await.unwrap();
        assert!(matches!(outcome, AlphaOutcome::UnknownEntity));
        let outcome = engine.compute(&AlphaScope::Sector("Real Estate".to_string())).await.unwrap();
        assert!(matches!(outcome, AlphaOutcome::UnknownEntity));
        assert!(source.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sector_pools_mentions() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(vec![
            article(hours_ago(now, 1), vec!["TCS", "INFY"], Some(0.6)),
            article(hours_ago(now, 2), vec!["WIPRO"], Some(0.0)),
            article(hours_ago(now, 3), vec!["HDFCBANK"], Some(-0.9)),
            article(hours_ago(now, 4), vec![], None),
        ]));
        let market = Arc::new(FakeMarket {
            changes: HashMap::from([
                ("TCS", Ok(Some(0.02))),
                ("INFY", Ok(Some(0.0))),
                ("WIPRO", Ok(Some(0.04))),
            ]),
            ..Default::default()
        });

        let outcome = engine(source, market.clone())
            .compute_at(&AlphaScope::Sector("IT".to_string()), now)
            .await
            .unwrap();
        let metric = outcome.metric().expect("recorded");

        // Pooled: the TCS+INFY article counts once.
        let current = 0.3;
        assert!((metric.expectation_gap - 0.0).abs() < 1e-12);
        assert!((metric.narrative_velocity - 0.5 * 5.0 * (1.0 + current)).abs() < 1e-9);
        // Flat INFY move left out: mean of 0.02 and 0.04.
        assert!((metric.divergence - (current - 0.03)).abs() < 1e-9);
        assert_eq!(metric.scope, AlphaScope::Sector("IT".to_string()));
        assert_eq!(market.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_sector_price_sample_limit() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(vec![article(hours_ago(now, 1), vec!["WIPRO"], Some(0.2))]));
        let market = Arc::new(FakeMarket::default());
        let config = AlphaEngineConfig {
            sector_price_sample: 2,
            ..Default::default()
        };
        let engine = AlphaEngine::new(source, market.clone(), config);
        let outcome = engine
            .compute_at(&AlphaScope::Sector("IT".to_string()), now)
            .await
            .unwrap();
        assert!(outcome.metric().is_some());
        let calls: Vec<String> = market.calls.lock().unwrap().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(calls, vec!["TCS", "INFY"]);
    }

    #[tokio::test]
    async fn test_reruns_append() {
        let now = Utc::now();
        let source = Arc::new(FakeSource::new(scenario(now)));
        let engine = engine(source.clone(), Arc::new(FakeMarket::default()));
        let scope = AlphaScope::Stock("TCS".to_string());
        engine.compute_at(&scope, now).await.unwrap();
        engine.compute_at(&scope, now).await.unwrap();
        assert_eq!(source.recorded.lock().unwrap().len(), 2);
    }
}
