//! Inference gateway
//!
//! The single seam between the advisory pipeline and a language model. The
//! pipeline only ever submits a prompt and receives raw text back; everything
//! the gateway returns is untrusted and goes through strict parsing.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::llm::{LlmClient, Message};

/// System instructions sent with every advisory prompt
const ADVISOR_SYSTEM_PROMPT: &str = "You are an expert business consultant advising small and \
medium-sized businesses. Always answer with a single valid JSON object and no surrounding prose.";

/// Submits a prompt to an inference backend and returns the raw response text.
///
/// Implementations fail with [`Error::Gateway`] on timeouts, non-success
/// responses, or malformed transport. Retry policy is the implementation's
/// business.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn submit(&self, prompt: &str) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "gateway"
    }
}

/// Gateway backed by the OpenRouter client
#[derive(Debug, Clone)]
pub struct LlmGateway {
    client: LlmClient,
    system_prompt: String,
}

impl LlmGateway {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            system_prompt: ADVISOR_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system instructions
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl InferenceGateway for LlmGateway {
    async fn submit(&self, prompt: &str) -> Result<String> {
        let messages = [
            Message::system(self.system_prompt.clone()),
            Message::user(prompt),
        ];

        match self.client.complete(&messages).await {
            Ok(completion) => {
                debug!(model = %completion.model, chars = completion.content.len(), "Inference response received");
                Ok(completion.content)
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "Inference request failed");
                Err(Error::Gateway(e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

/// Gateway used when no inference backend is configured.
///
/// Every submission fails, so callers always take their deterministic
/// fallback path.
#[derive(Debug, Clone, Default)]
pub struct OfflineGateway {
    reason: Option<String>,
}

impl OfflineGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl InferenceGateway for OfflineGateway {
    async fn submit(&self, _prompt: &str) -> Result<String> {
        Err(Error::Gateway(
            self.reason
                .clone()
                .unwrap_or_else(|| "offline mode: no inference backend configured".to_string()),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
