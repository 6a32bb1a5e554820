use async_trait::async_trait;
use chrono::{DateTime, Utc};
use signal_core::{AlphaDataSource, AlphaMetric, AlphaScope, PipelineResult, Signal};

use crate::db::SignalDb;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct AlphaRow {
    ticker: Option<String>,
    sector: Option<String>,
    window_hours: i64,
    expectation_gap: f64,
    narrative_velocity: f64,
    divergence: f64,
    composite_score: f64,
    signal: String,
    conviction: f64,
    computed_at: DateTime<Utc>,
}

impl TryFrom<AlphaRow> for AlphaMetric {
    type Error = StoreError;

    fn try_from(row: AlphaRow) -> Result<Self, Self::Error> {
        let scope = match (row.ticker, row.sector) {
            (Some(ticker), None) => AlphaScope::Stock(ticker),
            (None, Some(sector)) => AlphaScope::Sector(sector),
            _ => return Err(StoreError::Corrupt("alpha row without a single scope".to_string())),
        };
        let signal = row.signal.parse::<Signal>().map_err(StoreError::Corrupt)?;

        Ok(AlphaMetric {
            scope,
            window_hours: row.window_hours,
            expectation_gap: row.expectation_gap,
            narrative_velocity: row.narrative_velocity,
            divergence: row.divergence,
            composite_score: row.composite_score,
            signal,
            conviction: row.conviction,
            computed_at: row.computed_at,
        })
    }
}

/// Stock scopes filter on the ticker column, sector scopes on the sector.
fn scope_column(scope: &AlphaScope) -> &'static str {
    match scope {
        AlphaScope::Stock(_) => "s.ticker",
        AlphaScope::Sector(_) => "s.sector",
    }
}

impl SignalDb {
    pub async fn insert_alpha_metric(&self, metric: &AlphaMetric) -> StoreResult<i64> {
        let stock_id = match &metric.scope {
            AlphaScope::Stock(ticker) => Some(
                self.stock_id(ticker)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("stock {}", ticker)))?,
            ),
            AlphaScope::Sector(_) => None,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO alpha_metrics
                (stock_id, sector, window_hours, expectation_gap, narrative_velocity, divergence,
                 composite_score, signal, conviction, computed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(stock_id)
        .bind(metric.scope.sector())
        .bind(metric.window_hours)
        .bind(metric.expectation_gap)
        .bind(metric.narrative_velocity)
        .bind(metric.divergence)
        .bind(metric.composite_score)
        .bind(metric.signal.as_str())
        .bind(metric.conviction)
        .bind(metric.computed_at)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent snapshot for a scope and window length.
    pub async fn latest_alpha(&self, scope: &AlphaScope, window_hours: i64) -> StoreResult<Option<AlphaMetric>> {
        let sql = format!(
            r#"
            SELECT s.ticker AS ticker, am.sector AS sector, am.window_hours, am.expectation_gap,
                   am.narrative_velocity, am.divergence, am.composite_score, am.signal,
                   am.conviction, am.computed_at
            FROM alpha_metrics am
            LEFT JOIN stocks s ON s.id = am.stock_id
            WHERE {} = ? AND am.window_hours = ?
            ORDER BY am.computed_at DESC, am.id DESC
            LIMIT 1
            "#,
            match scope {
                AlphaScope::Stock(_) => "s.ticker",
                AlphaScope::Sector(_) => "am.sector",
            }
        );

        let row = sqlx::query_as::<_, AlphaRow>(&sql)
            .bind(scope.name())
            .bind(window_hours)
            .fetch_optional(self.pool())
            .await?;

        row.map(AlphaMetric::try_from).transpose()
    }

    /// Number of snapshots stored for a scope.
    pub async fn alpha_snapshot_count(&self, scope: &AlphaScope) -> StoreResult<i64> {
        let sql = match scope {
            AlphaScope::Stock(_) => {
                "SELECT COUNT(*) FROM alpha_metrics am JOIN stocks s ON s.id = am.stock_id WHERE s.ticker = ?"
            }
            AlphaScope::Sector(_) => "SELECT COUNT(*) FROM alpha_metrics am WHERE am.sector = ?",
        };
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(scope.name())
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl AlphaDataSource for SignalDb {
    async fn sentiment_scores(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<Vec<f64>> {
        let sql = format!(
            r#"
            SELECT sa.sentiment_score FROM sentiment_analyses sa
            WHERE sa.analyzed_at > ?
              AND sa.article_id IN (
                  SELECT asm.article_id FROM article_stock_mentions asm
                  JOIN stocks s ON s.id = asm.stock_id
                  WHERE {} = ?
              )
            "#,
            scope_column(scope)
        );

        let scores = sqlx::query_scalar::<_, f64>(&sql)
            .bind(since)
            .bind(scope.name())
            .fetch_all(self.pool())
            .await
            .map_err(StoreError::from)?;
        Ok(scores)
    }

    async fn mentioned_article_count(&self, scope: &AlphaScope, since: DateTime<Utc>) -> PipelineResult<i64> {
        let sql = format!(
            r#"
            SELECT COUNT(DISTINCT a.id) FROM news_articles a
            JOIN article_stock_mentions asm ON asm.article_id = a.id
            JOIN stocks s ON s.id = asm.stock_id
            WHERE a.scraped_at > ? AND {} = ?
            "#,
            scope_column(scope)
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(since)
            .bind(scope.name())
            .fetch_one(self.pool())
            .await
            .map_err(StoreError::from)?;
        Ok(count)
    }

    async fn article_count(&self, since: DateTime<Utc>) -> PipelineResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news_articles WHERE scraped_at > ?")
            .bind(since)
            .fetch_one(self.pool())
            .await
            .map_err(StoreError::from)?;
        Ok(count)
    }

    async fn sector_tickers(&self, sector: &str) -> PipelineResult<Vec<String>> {
        let tickers = sqlx::query_scalar::<_, String>(
            "SELECT ticker FROM stocks WHERE sector = ? AND is_active = 1 ORDER BY id",
        )
        .bind(sector)
        .fetch_all(self.pool())
        .await
        .map_err(StoreError::from)?;
        Ok(tickers)
    }

    async fn stock_exists(&self, ticker: &str) -> PipelineResult<bool> {
        Ok(self.stock_id(ticker).await?.is_some())
    }

    async fn record_alpha_metric(&self, metric: &AlphaMetric) -> PipelineResult<i64> {
        Ok(self.insert_alpha_metric(metric).await?)
    }
}
