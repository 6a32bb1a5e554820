//! Completion transports for hosted LLM providers.
//!
//! A transport only moves a prompt to the provider and returns the raw text of
//! the reply. Key selection, rate limiting and response validation live with the
//! caller so every provider is gated the same way.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MLError, MLResult};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Send `prompt` authenticated with `api_key`; return the reply text.
    async fn complete(&self, api_key: &str, prompt: &str) -> MLResult<String>;
}

fn build_client(timeout: Duration) -> MLResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn check_status(provider: &str, status: StatusCode) -> MLResult<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MLError::Unauthorized(format!(
            "{} rejected key ({})",
            provider, status
        ))),
        _ => Err(MLError::ServiceUnavailable(format!(
            "{} returned {}",
            provider, status
        ))),
    }
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPartOut<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiReplyContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiReplyContent {
    #[serde(default)]
    parts: Vec<GeminiPartIn>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartIn {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct GeminiTransport {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiTransport {
    pub fn new(model: impl Into<String>, timeout: Duration) -> MLResult<Self> {
        Self::with_base_url(GEMINI_BASE_URL, model, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> MLResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl CompletionTransport for GeminiTransport {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> MLResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPartOut { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        check_status("gemini", response.status())?;

        let body = response.json::<GeminiResponse>().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MLError::InvalidResponse("gemini returned no text".to_string()));
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// OpenRouter (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageOut<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessageOut<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageIn,
}

#[derive(Debug, Deserialize)]
struct ChatMessageIn {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenRouterTransport {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenRouterTransport {
    pub fn new(model: impl Into<String>, timeout: Duration) -> MLResult<Self> {
        Self::with_base_url(OPENROUTER_BASE_URL, model, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> MLResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterTransport {
    fn provider_name(&self) -> &'static str {
        "openrouter"
    }

    async fn complete(&self, api_key: &str, prompt: &str) -> MLResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessageOut {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        check_status("openrouter", response.status())?;

        let body = response.json::<ChatResponse>().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MLError::InvalidResponse("openrouter returned no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_gemini_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"sentiment_score\": 0.4}" }] }
                }]
            })))
            .mount(&server)
            .await;

        let transport =
            GeminiTransport::with_base_url(server.uri(), "gemini-2.0-flash", Duration::from_secs(5))
                .unwrap();
        let text = transport.complete("key-1", "prompt").await.unwrap();
        assert_eq!(text, "{\"sentiment_score\": 0.4}");
    }

    #[tokio::test]
    async fn test_gemini_unauthorized_is_key_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let transport =
            GeminiTransport::with_base_url(server.uri(), "gemini-2.0-flash", Duration::from_secs(5))
                .unwrap();
        let err = transport.complete("bad", "prompt").await.unwrap_err();
        assert!(err.is_key_failure());
    }

    #[tokio::test]
    async fn test_openrouter_extracts_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer or-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"confidence\": 0.7}" } }]
            })))
            .mount(&server)
            .await;

        let transport = OpenRouterTransport::with_base_url(
            server.uri(),
            "google/gemini-2.0-flash-001",
            Duration::from_secs(5),
        )
        .unwrap();
        let text = transport.complete("or-key", "prompt").await.unwrap();
        assert_eq!(text, "{\"confidence\": 0.7}");
    }

    #[tokio::test]
    async fn test_openrouter_rate_limited_is_not_key_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let transport = OpenRouterTransport::with_base_url(
            server.uri(),
            "google/gemini-2.0-flash-001",
            Duration::from_secs(5),
        )
        .unwrap();
        let err = transport.complete("k", "prompt").await.unwrap_err();
        assert!(!err.is_key_failure());
        assert!(matches!(err, MLError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_openrouter_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let transport =
            OpenRouterTransport::with_base_url(server.uri(), "m", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            transport.complete("k", "p").await,
            Err(MLError::InvalidResponse(_))
        ));
    }
}
