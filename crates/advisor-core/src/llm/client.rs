//! OpenRouter chat completions client
//!
//! A request walks the model chain (default model, then fallbacks). Each model
//! gets a few attempts when rate limited; model-specific failures move on to
//! the next model, anything else is returned immediately.

use std::time::Duration;

use rand::Rng;
use reqwest::Client as HttpClient;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::types::{ChatRequest, ChatResponse, Completion, Message};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Used when a 429 body carries no retry hint
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Backoff applied to rate-limited requests on a single model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No retries; useful in tests
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Exponential delay, at least the server's hint, plus up to 10% jitter
    pub fn delay(&self, attempt: u32, retry_after_secs: u64) -> Duration {
        let exponential = self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = exponential.max(Duration::from_secs(retry_after_secs));

        let jitter_ms = (delay.as_millis() as u64 / 10).max(1);
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }
}

/// OpenRouter client. Clones share the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    http: HttpClient,
    settings: LlmConfig,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("models", &self.models().collect::<Vec<_>>())
            .field("retry", &self.retry)
            .finish()
    }
}

impl LlmClient {
    pub fn new(settings: LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::LLMError("API key is required".to_string()));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            settings,
            api_key,
            base_url: OPENROUTER_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Point at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Models in the order they are tried, without duplicates
    pub fn models(&self) -> impl Iterator<Item = &str> {
        let mut seen = Vec::new();
        std::iter::once(self.settings.default_model.as_str())
            .chain(self.settings.fallback_models.iter().map(String::as_str))
            .filter(move |model| {
                if model.trim().is_empty() || seen.contains(model) {
                    return false;
                }
                seen.push(*model);
                true
            })
    }

    /// Complete on the first model in the chain that answers
    pub async fn complete(&self, messages: &[Message]) -> Result<Completion> {
        let mut last_error = None;

        for model in self.models() {
            match self.complete_on(model, messages).await {
                Ok(completion) => {
                    if completion.truncated {
                        warn!(model, "Completion hit the token limit");
                    }
                    info!(model, tokens = completion.tokens_used, "Completion received");
                    return Ok(completion);
                }
                Err(e) if worth_next_model(&e) => {
                    warn!(model, error = %e, "Model unavailable, trying next in chain");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::NoSuitableModel("no models configured".to_string())))
    }

    /// Complete on one model, retrying while rate limited
    pub async fn complete_on(&self, model: &str, messages: &[Message]) -> Result<Completion> {
        let mut request = ChatRequest::new(
            model,
            messages,
            self.settings.temperature,
            self.settings.max_tokens,
        );
        if self.settings.json_mode {
            request = request.json_object();
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&request).await {
                Err(Error::RateLimited(secs)) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt, secs);
                    warn!(model, attempt, delay_ms = delay.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<Completion> {
        debug!(model = request.model, messages = request.messages.len(), "Sending completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Title", "Business Advisor")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::LLMError(format!("Malformed completion response: {}", e)))?
            .into_completion()
            .ok_or_else(|| Error::LLMError("Completion response had no choices".to_string()))
    }
}

fn status_error(status: u16, body: &str) -> Error {
    match status {
        401 => Error::LLMError(
            "Unauthorized: invalid API key. Check ADVISOR_API_KEY or OPENROUTER_API_KEY.".to_string(),
        ),
        402 => Error::LLMError("Payment required: insufficient OpenRouter credits".to_string()),
        404 => Error::LLMError(format!("Model not found: {}", body)),
        429 => Error::RateLimited(retry_after(body).unwrap_or(DEFAULT_RETRY_AFTER_SECS)),
        500..=599 => Error::LLMError(format!("Provider unavailable ({}): {}", status, body)),
        _ => Error::LLMError(format!("HTTP {}: {}", status, body)),
    }
}

/// Rate limits and model-side outages are worth another model; auth and
/// request errors are not
fn worth_next_model(error: &Error) -> bool {
    const MODEL_FAILURES: [&str; 6] = [
        "model not found",
        "unavailable",
        "not available",
        "no available provider",
        "overloaded",
        "capacity",
    ];

    match error {
        Error::RateLimited(_) => true,
        Error::LLMError(msg) => {
            let lower = msg.to_lowercase();
            MODEL_FAILURES.iter().any(|pattern| lower.contains(pattern))
        }
        _ => false,
    }
}

fn retry_after(body: &str) -> Option<u64> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("retry_after")
        .or_else(|| json.pointer("/error/retry_after"))
        .and_then(|v| v.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LlmConfig {
        LlmConfig {
            default_model: "test/model".to_string(),
            fallback_models: vec!["fallback/model".to_string(), "test/model".to_string()],
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(LlmClient::new(settings(), "   ").is_err());
        assert!(LlmClient::new(settings(), "sk-test").is_ok());
    }

    #[test]
    fn test_model_chain_skips_duplicates() {
        let client = LlmClient::new(settings(), "sk-test").unwrap();
        let models: Vec<&str> = client.models().collect();
        assert_eq!(models, vec!["test/model", "fallback/model"]);
    }

    #[test]
    fn test_debug_hides_key() {
        let client = LlmClient::new(settings(), "sk-very-secret")
            .unwrap()
            .with_base_url("https://example.com/v1/");
        let debug = format!("{:?}", client);
        assert!(debug.contains("https://example.com/v1\""));
        assert!(!debug.contains("sk-very-secret"));
    }

    #[test]
    fn test_status_errors() {
        assert!(matches!(status_error(429, r#"{"retry_after": 7}"#), Error::RateLimited(7)));
        assert!(matches!(status_error(429, "slow down"), Error::RateLimited(60)));
        assert!(worth_next_model(&status_error(404, "no such model")));
        assert!(worth_next_model(&status_error(503, "")));
        assert!(!worth_next_model(&status_error(401, "")));
        assert!(!worth_next_model(&status_error(400, "bad json")));
    }

    #[test]
    fn test_retry_after_locations() {
        assert_eq!(retry_after(r#"{"retry_after": 30}"#), Some(30));
        assert_eq!(retry_after(r#"{"error": {"retry_after": 60}}"#), Some(60));
        assert_eq!(retry_after("not json"), None);
    }

    #[test]
    fn test_retry_delay() {
        let policy = RetryPolicy::default();
        assert!(policy.delay(1, 0) >= Duration::from_secs(1));
        assert!(policy.delay(2, 0) >= Duration::from_secs(2));
        assert!(policy.delay(1, 5) >= Duration::from_secs(5));
        assert!(policy.delay(1, 5) < Duration::from_millis(5500));
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
