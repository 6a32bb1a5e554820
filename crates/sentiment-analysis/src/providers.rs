use async_trait::async_trait;
use ml_client::{key_suffix, CompletionTransport, KeyRotator, MLResult, RateLimiter};
use serde_json::Value;
use std::sync::Arc;

use crate::prompt::sentiment_prompt;
use crate::response::{parse_llm_response, LlmAnalysis};

/// Successful provider call.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub provider: String,
    pub analysis: LlmAnalysis,
    pub raw: Value,
}

/// One LLM provider in the fallback chain.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// A provider with no keys is skipped by the ensemble.
    fn is_configured(&self) -> bool;

    async fn attempt(&self, text: &str, context: &str) -> MLResult<ProviderReply>;
}

/// Provider gated by its own rate limiter and key rotator. Both handles are
/// shared with every worker that talks to the same provider.
pub struct KeyedProvider {
    transport: Arc<dyn CompletionTransport>,
    limiter: Arc<RateLimiter>,
    keys: Arc<KeyRotator>,
}

impl KeyedProvider {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        limiter: Arc<RateLimiter>,
        keys: Arc<KeyRotator>,
    ) -> Self {
        Self {
            transport,
            limiter,
            keys,
        }
    }
}

#[async_trait]
impl LlmProvider for KeyedProvider {
    fn name(&self) -> &str {
        self.transport.provider_name()
    }

    fn is_configured(&self) -> bool {
        !self.keys.is_empty()
    }

    async fn attempt(&self, text: &str, context: &str) -> MLResult<ProviderReply> {
        // Surface missing keys before waiting on the limiter.
        let key = self.keys.get_next()?;
        self.limiter.acquire().await;

        tracing::debug!(
            "Calling {} with key ...{} (text length={})",
            self.name(),
            key_suffix(&key),
            text.len()
        );

        let prompt = sentiment_prompt(text, context);
        let raw = match self.transport.complete(&key, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.is_key_failure() {
                    self.keys.mark_failed(&key);
                }
                return Err(e);
            }
        };

        let (analysis, raw) = parse_llm_response(&raw)?;
        Ok(ProviderReply {
            provider: self.name().to_string(),
            analysis,
            raw,
        })
    }
}

impl std::fmt::Debug for KeyedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedProvider")
            .field("provider", &self.transport.provider_name())
            .field("keys", &self.keys)
            .finish()
    }
}

/// Convenience for callers that only need to know whether a chain can ever
/// reach an LLM.
pub fn any_configured(providers: &[Arc<dyn LlmProvider>]) -> bool {
    providers.iter().any(|p| p.is_configured())
}
