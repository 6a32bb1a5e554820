//! Daily closes for NSE-listed stocks from a Yahoo-chart-compatible endpoint,
//! reduced to a fractional close-to-close move.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use signal_core::{MarketDataProvider, PipelineError, PipelineResult};
use std::time::Duration;

pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Chart range requested; long enough to hold any sensible session lookback.
const CHART_RANGE: &str = "1mo";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; alphastream/0.1)";

/// Yahoo symbol for an NSE ticker.
pub fn yahoo_symbol(ticker: &str) -> String {
    format!("{}.NS", ticker)
}

/// `(last - first) / first` over the closes given. `None` with fewer than two
/// closes or a zero starting price.
pub fn close_to_close_change(closes: &[f64]) -> Option<f64> {
    let (first, last) = match closes {
        [first, .., last] => (*first, *last),
        _ => return None,
    };
    if first == 0.0 || !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last - first) / first)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Clone)]
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(YAHOO_CHART_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Daily closes for a ticker, oldest first, with missing sessions dropped.
    pub async fn daily_closes(&self, ticker: &str) -> PipelineResult<Vec<f64>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol(ticker));
        let response = self
            .client
            .get(&url)
            .query(&[("range", CHART_RANGE), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| PipelineError::Upstream(format!("chart request for {}: {}", ticker, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Upstream(format!(
                "chart request for {} returned {}",
                ticker, status
            )));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Upstream(format!("chart payload for {}: {}", ticker, e)))?;

        if let Some(err) = body.chart.error {
            return Err(PipelineError::Upstream(format!(
                "chart error for {}: {} {}",
                ticker, err.code, err.description
            )));
        }

        let closes = body
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.indicators.quote.into_iter().next())
            .map(|quote| quote.close.into_iter().flatten().collect())
            .unwrap_or_default();

        Ok(closes)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    async fn price_change_fraction(&self, ticker: &str, lookback_sessions: u32) -> PipelineResult<Option<f64>> {
        let closes = self.daily_closes(ticker).await?;
        let start = closes.len().saturating_sub(lookback_sessions as usize);
        let change = close_to_close_change(&closes[start..]);
        tracing::debug!("{}: {} closes, change {:?}", ticker, closes.len(), change);
        Ok(change)
    }
}
