mod events;
mod redis_channel;

pub use events::{AlphaPayload, PipelineEvent};
pub use redis_channel::RedisPublisher;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Transport for serialized events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Writes events to the log only. Used when no broker is configured.
#[derive(Debug, Default, Clone)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), NotificationError> {
        tracing::debug!(channel, payload, "Event (log sink)");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Keeps published events in memory, in publish order.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<(String, String)>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(channel, payload)` pairs published so far.
    pub fn published(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), NotificationError> {
        if let Ok(mut events) = self.events.lock() {
            events.push((channel.to_string(), payload.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Fire-and-forget event dispatch. Publishing never fails the caller.
#[derive(Clone)]
pub struct Notifier {
    publisher: Arc<dyn EventPublisher>,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// Redis when a URL is given and reachable, otherwise the log sink.
    pub async fn from_redis_url(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url.filter(|u| !u.trim().is_empty()) else {
            tracing::info!("No REDIS_URL configured, events go to the log only");
            return Self::new(Arc::new(LogPublisher));
        };

        match RedisPublisher::connect(url).await {
            Ok(publisher) => {
                tracing::info!("Event publishing enabled (redis)");
                Self::new(Arc::new(publisher))
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, events go to the log only: {}", e);
                Self::new(Arc::new(LogPublisher))
            }
        }
    }

    pub fn publisher_name(&self) -> &str {
        self.publisher.name()
    }

    /// Publish and wait. Returns whether the event went out; failures are logged.
    pub async fn notify(&self, event: &PipelineEvent) -> bool {
        let channel = event.channel();
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize {} event: {}", event.kind(), e);
                return false;
            }
        };

        match self.publisher.publish(&channel, &payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to publish {} via {}: {}",
                    event.kind(),
                    self.publisher.name(),
                    e
                );
                false
            }
        }
    }

    /// Publish on a background task.
    pub fn notify_detached(&self, event: PipelineEvent) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify(&event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signal_core::Article;

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _channel: &str, _payload: &str) -> Result<(), NotificationError> {
            Err(NotificationError::Redis("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn article() -> Article {
        Article {
            id: 1,
            url: "https://example.com/a".to_string(),
            title: "Sensex rises".to_string(),
            summary: None,
            full_text: None,
            source: "Mint".to_string(),
            published_at: Utc::now(),
            scraped_at: Utc::now(),
            content_hash: "abc".to_string(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_notify_publishes_envelope() {
        let sink = Arc::new(MemoryPublisher::new());
        let notifier = Notifier::new(sink.clone());

        assert!(notifier.notify(&PipelineEvent::new_article(&article())).await);

        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "feed");
        let json: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(json["type"], "new_article");
        assert_eq!(json["data"]["title"], "Sensex rises");
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let notifier = Notifier::new(Arc::new(FailingPublisher));
        assert!(!notifier.notify(&PipelineEvent::new_article(&article())).await);
    }

    #[tokio::test]
    async fn test_missing_redis_url_falls_back_to_log() {
        let notifier = Notifier::from_redis_url(None).await;
        assert_eq!(notifier.publisher_name(), "log");
    }
}
