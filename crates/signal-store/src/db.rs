use signal_core::TrackedStock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::StoreResult;

/// SQLite-backed store for articles, mentions, sentiment records and alpha
/// snapshots. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct SignalDb {
    pool: SqlitePool,
}

impl SignalDb {
    /// Connect and apply the schema. In-memory databases are pinned to a
    /// single long-lived connection so every query sees the same data.
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!("Signal store ready at {}", database_url);
        Ok(db)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        let schema = include_str!("../schema.sql");

        // sqlx runs one statement per query
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or refresh the tracked universe. Safe to run on every start.
    pub async fn seed_stocks(&self, stocks: &[TrackedStock]) -> StoreResult<usize> {
        for stock in stocks {
            sqlx::query(
                r#"
                INSERT INTO stocks (ticker, company_name, sector)
                VALUES (?, ?, ?)
                ON CONFLICT(ticker) DO UPDATE SET
                    company_name = excluded.company_name,
                    sector = excluded.sector,
                    is_active = 1
                "#,
            )
            .bind(&stock.ticker)
            .bind(&stock.company_name)
            .bind(&stock.sector)
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Seeded {} tracked stocks", stocks.len());
        Ok(stocks.len())
    }

    pub async fn stock_count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stocks WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn stock_id(&self, ticker: &str) -> StoreResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM stocks WHERE ticker = ? AND is_active = 1")
            .bind(ticker)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn stock(ticker: &str, sector: &str) -> TrackedStock {
        TrackedStock {
            ticker: ticker.to_string(),
            company_name: format!("{} Ltd", ticker),
            sector: sector.to_string(),
        }
    }

    pub(crate) async fn seeded_db() -> SignalDb {
        let db = SignalDb::new("sqlite::memory:").await.unwrap();
        db.seed_stocks(&[
            stock("TCS", "IT"),
            stock("INFY", "IT"),
            stock("WIPRO", "IT"),
            stock("HDFCBANK", "Banking"),
        ])
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_db_creation() {
        let db = SignalDb::new("sqlite::memory:").await.unwrap();
        assert!(db.pool().acquire().await.is_ok());
        assert_eq!(db.stock_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = seeded_db().await;
        db.seed_stocks(&[stock("TCS", "IT")]).await.unwrap();
        assert_eq!(db.stock_count().await.unwrap(), 4);
        assert!(db.stock_id("TCS").await.unwrap().is_some());
        assert!(db.stock_id("NOPE").await.unwrap().is_none());
    }
}
