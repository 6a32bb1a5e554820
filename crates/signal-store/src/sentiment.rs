use chrono::{DateTime, Utc};
use signal_core::{ImpactTimeline, SentimentRecord};

use crate::db::SignalDb;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct SentimentRow {
    article_id: i64,
    sentiment_score: f64,
    confidence: f64,
    explanation: String,
    impact_timeline: String,
    classifier_score: Option<f64>,
    llm_score: Option<f64>,
    llm_provider: Option<String>,
    raw_response: Option<String>,
    analyzed_at: DateTime<Utc>,
}

impl TryFrom<SentimentRow> for SentimentRecord {
    type Error = StoreError;

    fn try_from(row: SentimentRow) -> Result<Self, Self::Error> {
        let impact_timeline = row.impact_timeline.parse::<ImpactTimeline>().map_err(StoreError::Corrupt)?;
        let raw_response = row
            .raw_response
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(SentimentRecord {
            article_id: row.article_id,
            sentiment_score: row.sentiment_score,
            confidence: row.confidence,
            explanation: row.explanation,
            impact_timeline,
            classifier_score: row.classifier_score,
            llm_score: row.llm_score,
            llm_provider: row.llm_provider,
            raw_response,
            analyzed_at: row.analyzed_at,
        })
    }
}

impl SignalDb {
    /// Store the sentiment record for an article. A re-run replaces the
    /// existing record in place.
    pub async fn save_sentiment(&self, record: &SentimentRecord) -> StoreResult<()> {
        let raw_response = record
            .raw_response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO sentiment_analyses
                (article_id, sentiment_score, confidence, explanation, impact_timeline,
                 classifier_score, llm_score, llm_provider, raw_response, analyzed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(article_id) DO UPDATE SET
                sentiment_score = excluded.sentiment_score,
                confidence = excluded.confidence,
                explanation = excluded.explanation,
                impact_timeline = excluded.impact_timeline,
                classifier_score = excluded.classifier_score,
                llm_score = excluded.llm_score,
                llm_provider = excluded.llm_provider,
                raw_response = excluded.raw_response,
                analyzed_at = excluded.analyzed_at
            "#,
        )
        .bind(record.article_id)
        .bind(record.sentiment_score)
        .bind(record.confidence)
        .bind(&record.explanation)
        .bind(record.impact_timeline.as_str())
        .bind(record.classifier_score)
        .bind(record.llm_score)
        .bind(&record.llm_provider)
        .bind(raw_response)
        .bind(record.analyzed_at)
        .execute(self.pool())
        .await?;

        tracing::debug!("Stored sentiment for article {}", record.article_id);
        Ok(())
    }

    pub async fn get_sentiment(&self, article_id: i64) -> StoreResult<Option<SentimentRecord>> {
        let row = sqlx::query_as::<_, SentimentRow>("SELECT * FROM sentiment_analyses WHERE article_id = ?")
            .bind(article_id)
            .fetch_optional(self.pool())
            .await?;

        row.map(SentimentRecord::try_from).transpose()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::articles::tests::new_article;
    use crate::db::tests::seeded_db;
    use serde_json::json;
    use signal_core::ArticleStore;

    pub(crate) fn record(article_id: i64, score: f64, analyzed_at: DateTime<Utc>) -> SentimentRecord {
        SentimentRecord {
            article_id,
            sentiment_score: score,
            confidence: 0.7,
            explanation: "Upbeat guidance".to_string(),
            impact_timeline: ImpactTimeline::ShortTerm,
            classifier_score: Some(score),
            llm_score: Some(score),
            llm_provider: Some("gemini".to_string()),
            raw_response: Some(json!({"sentiment_score": score})),
            analyzed_at,
        }
    }

    #[tokio::test]
    async fn test_save_and_get_sentiment() {
        let db = seeded_db().await;
        let now = Utc::now();
        let id = db
            .insert_article(&new_article("https://a.example/1", "One", now))
            .await
            .unwrap()
            .unwrap();

        db.save_sentiment(&record(id, 0.6, now)).await.unwrap();
        let stored = db.get_sentiment(id).await.unwrap().unwrap();
        assert_eq!(stored.sentiment_score, 0.6);
        assert_eq!(stored.impact_timeline, ImpactTimeline::ShortTerm);
        assert_eq!(stored.raw_response, Some(json!({"sentiment_score": 0.6})));
        assert_eq!(stored.llm_provider.as_deref(), Some("gemini"));

        assert!(db.articles_pending_sentiment(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_record_per_article() {
        let db = seeded_db().await;
        let now = Utc::now();
        let id = db
            .insert_article(&new_article("https://a.example/1", "One", now))
            .await
            .unwrap()
            .unwrap();

        db.save_sentiment(&record(id, 0.6, now)).await.unwrap();
        let later = now + chrono::Duration::minutes(5);
        db.save_sentiment(&record(id, -0.4, later)).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sentiment_analyses WHERE article_id = ?")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
        let stored = db.get_sentiment(id).await.unwrap().unwrap();
        assert_eq!(stored.sentiment_score, -0.4);
        assert_eq!(stored.llm_score, Some(-0.4));
        assert_eq!(stored.analyzed_at.timestamp(), later.timestamp());
    }

    #[tokio::test]
    async fn test_classifier_only_record() {
        let db = seeded_db().await;
        let now = Utc::now();
        let id = db
            .insert_article(&new_article("https://a.example/1", "One", now))
            .await
            .unwrap()
            .unwrap();
        let mut rec = record(id, 0.0, now);
        rec.llm_score = None;
        rec.llm_provider = None;
        rec.raw_response = None;
        rec.impact_timeline = ImpactTimeline::Unknown;

        db.save_sentiment(&rec).await.unwrap();
        let stored = db.get_sentiment(id).await.unwrap().unwrap();
        assert_eq!(stored.llm_score, None);
        assert_eq!(stored.raw_response, None);
        assert!(db.get_sentiment(id + 1).await.unwrap().is_none());
    }
}
