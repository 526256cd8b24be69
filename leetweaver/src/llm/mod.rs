//! Text generation backend used by every solver agent.
//!
//! ## Module Structure
//!
//! - `client` - Gemini `generateContent` client
//! - `rate_limit` - Sliding-window limiter shared by all calls

pub mod client;
pub mod rate_limit;

pub use client::GeminiClient;
pub use rate_limit::RateLimiter;

use leetweaver_sdk::async_trait;
use thiserror::Error;

/// Prompt in, text out.
///
/// Implementations never fail: an API error or a safety block yields an
/// empty string, which agents treat as "no response".
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, prompt: &str) -> String;
}

/// Errors raised inside a generation backend before they are flattened to ""
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("response contained no text")]
    EmptyResponse,
}
