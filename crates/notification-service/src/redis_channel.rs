use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::{EventPublisher, NotificationError};

/// Redis pub/sub publisher. The connection manager reconnects on its own and
/// is cheap to clone per publish.
#[derive(Clone)]
pub struct RedisPublisher {
    connection: ConnectionManager,
}

impl RedisPublisher {
    pub async fn connect(redis_url: &str) -> Result<Self, NotificationError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| NotificationError::Config(format!("invalid REDIS_URL: {}", e)))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| NotificationError::Redis(e.to_string()))?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), NotificationError> {
        let mut connection = self.connection.clone();
        let receivers: i64 = connection
            .publish(channel, payload)
            .await
            .map_err(|e| NotificationError::Redis(e.to_string()))?;
        tracing::debug!("Published to {} ({} receivers)", channel, receivers);
        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }
}
