use anyhow::{bail, Context, Result};
use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use alpha_metrics::AlphaEngineConfig;
use ml_client::MLConfig;
use news_ingest::DedupConfig;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Storage and events
    pub database_url: String,
    pub redis_url: Option<String>,

    // Model services
    pub gemini_api_keys: Vec<String>,
    pub openrouter_api_keys: Vec<String>,
    pub gemini_model: String,
    pub openrouter_model: String,
    pub llm_requests_per_minute: u32,
    pub finbert_url: Option<String>,
    pub http_timeout_secs: u64,

    // Scheduling
    pub sentiment_scan_interval_secs: u64, // 300
    pub ticker_scan_interval_secs: u64,    // 300
    pub alpha_scan_interval_secs: u64,     // 900
    pub pending_batch_size: i64,
    pub max_concurrent_tasks: usize,
    pub task_max_retries: u32,
    pub task_retry_delay_ms: u64,

    // Alpha windows
    pub alpha_window_hours: i64,
    pub alpha_baseline_days: i64,
    pub price_lookback_sessions: u32,

    // Deduplication
    pub fuzzy_dedup_threshold: f64,
    pub fuzzy_window_minutes: i64,
    pub fuzzy_window_max_titles: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:alphastream.db".to_string(),
            redis_url: None,
            gemini_api_keys: Vec::new(),
            openrouter_api_keys: Vec::new(),
            gemini_model: "gemini-2.0-flash".to_string(),
            openrouter_model: "google/gemini-2.0-flash-001".to_string(),
            llm_requests_per_minute: 15,
            finbert_url: None,
            http_timeout_secs: 30,
            sentiment_scan_interval_secs: 300,
            ticker_scan_interval_secs: 300,
            alpha_scan_interval_secs: 900,
            pending_batch_size: 50,
            max_concurrent_tasks: 8,
            task_max_retries: 2,
            task_retry_delay_ms: 500,
            alpha_window_hours: 24,
            alpha_baseline_days: 7,
            price_lookback_sessions: 5,
            fuzzy_dedup_threshold: 0.85,
            fuzzy_window_minutes: 180,
            fuzzy_window_max_titles: 200,
        }
    }
}

fn var_or<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{} has an invalid value: {:?}", name, raw))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// API keys as a comma-separated list or a JSON array of strings.
pub fn parse_key_list(raw: &str) -> Result<Vec<String>> {
    let raw = raw.trim();
    let keys: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str::<Vec<String>>(raw).context("key list is not a JSON array of strings")?
    } else {
        raw.split(',').map(str::to_string).collect()
    };
    Ok(keys
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect())
}

fn key_list_var(name: &str) -> Result<Vec<String>> {
    match optional_var(name) {
        Some(raw) => parse_key_list(&raw).with_context(|| format!("{} could not be parsed", name)),
        None => Ok(Vec::new()),
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:alphastream.db".to_string()),
            redis_url: optional_var("REDIS_URL"),

            gemini_api_keys: key_list_var("GEMINI_API_KEYS")?,
            openrouter_api_keys: key_list_var("OPENROUTER_API_KEYS")?,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            openrouter_model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.0-flash-001".to_string()),
            llm_requests_per_minute: var_or("LLM_REQUESTS_PER_MINUTE", "15")?,
            finbert_url: optional_var("FINBERT_URL"),
            http_timeout_secs: var_or("HTTP_TIMEOUT_SECS", "30")?,

            sentiment_scan_interval_secs: var_or("SENTIMENT_SCAN_INTERVAL", "300")?,
            ticker_scan_interval_secs: var_or("TICKER_SCAN_INTERVAL", "300")?,
            alpha_scan_interval_secs: var_or("ALPHA_SCAN_INTERVAL", "900")?,
            pending_batch_size: var_or("PENDING_BATCH_SIZE", "50")?,
            max_concurrent_tasks: var_or("MAX_CONCURRENT_TASKS", "8")?,
            task_max_retries: var_or("TASK_MAX_RETRIES", "2")?,
            task_retry_delay_ms: var_or("TASK_RETRY_DELAY_MS", "500")?,

            alpha_window_hours: var_or("ALPHA_WINDOW_HOURS", "24")?,
            alpha_baseline_days: var_or("ALPHA_BASELINE_DAYS", "7")?,
            price_lookback_sessions: var_or("PRICE_LOOKBACK_SESSIONS", "5")?,

            fuzzy_dedup_threshold: var_or("FUZZY_DEDUP_THRESHOLD", "0.85")?,
            fuzzy_window_minutes: var_or("FUZZY_WINDOW_MINUTES", "180")?,
            fuzzy_window_max_titles: var_or("FUZZY_WINDOW_MAX_TITLES", "200")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fuzzy_dedup_threshold > 0.0 && self.fuzzy_dedup_threshold <= 1.0) {
            bail!("FUZZY_DEDUP_THRESHOLD must be in (0, 1], got {}", self.fuzzy_dedup_threshold);
        }
        if self.llm_requests_per_minute == 0 {
            bail!("LLM_REQUESTS_PER_MINUTE must be greater than zero");
        }
        if self.alpha_window_hours <= 0 || self.alpha_baseline_days <= 0 {
            bail!("ALPHA_WINDOW_HOURS and ALPHA_BASELINE_DAYS must be positive");
        }
        if self.alpha_baseline_days * 24 < self.alpha_window_hours {
            bail!("ALPHA_BASELINE_DAYS must cover at least ALPHA_WINDOW_HOURS");
        }
        if self.price_lookback_sessions < 2 {
            bail!("PRICE_LOOKBACK_SESSIONS must be at least 2");
        }
        if self.fuzzy_window_minutes <= 0 || self.fuzzy_window_max_titles <= 0 {
            bail!("FUZZY_WINDOW_MINUTES and FUZZY_WINDOW_MAX_TITLES must be positive");
        }
        if self.sentiment_scan_interval_secs == 0
            || self.ticker_scan_interval_secs == 0
            || self.alpha_scan_interval_secs == 0
        {
            bail!("Scan intervals must be positive");
        }
        if self.pending_batch_size <= 0 || self.max_concurrent_tasks == 0 {
            bail!("PENDING_BATCH_SIZE and MAX_CONCURRENT_TASKS must be positive");
        }
        if self.http_timeout_secs == 0 {
            bail!("HTTP_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }

    pub fn ml_config(&self) -> MLConfig {
        MLConfig {
            classifier_url: self.finbert_url.clone(),
            gemini_model: self.gemini_model.clone(),
            openrouter_model: self.openrouter_model.clone(),
            requests_per_minute: NonZeroU32::new(self.llm_requests_per_minute).unwrap_or(NonZeroU32::MIN),
            timeout: self.http_timeout(),
        }
    }

    pub fn alpha_config(&self) -> AlphaEngineConfig {
        AlphaEngineConfig {
            window_hours: self.alpha_window_hours,
            baseline_days: self.alpha_baseline_days,
            price_lookback_sessions: self.price_lookback_sessions,
            ..Default::default()
        }
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            fuzzy_threshold: self.fuzzy_dedup_threshold,
            fuzzy_window: chrono::Duration::minutes(self.fuzzy_window_minutes),
            fuzzy_max_titles: self.fuzzy_window_max_titles,
            ..Default::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.task_retry_delay_ms)
    }
}
