//! LLM integration - OpenRouter API
//!
//! - `client`: chat completions over a model fallback chain with rate-limit backoff
//! - `types`: OpenAI-compatible request and response bodies

mod client;
mod types;

pub use client::{LlmClient, RetryPolicy};
pub use types::{ChatRequest, ChatResponse, Choice, Completion, Message, MessageRole, Usage};
