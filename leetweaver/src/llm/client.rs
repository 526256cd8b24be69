//! Gemini `generateContent` client with rate limiting.

use std::time::Duration;

use leetweaver_sdk::async_trait;
use serde::{Deserialize, Serialize};

use super::{Generate, LlmError, RateLimiter};
use crate::config::LlmConfig;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Finish reasons that mean the candidate was withheld
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Rate-limited Gemini client. Construct once and share it behind an `Arc`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    limiter: RateLimiter,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        tracing::info!(
            model = %config.model,
            rpm = config.requests_per_minute,
            "generation client ready"
        );
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            limiter: RateLimiter::per_minute(config.requests_per_minute),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One rate-limited call, with errors kept typed
    pub async fn try_generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.limiter.acquire().await;

        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "sending generation request");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed = response.json::<GenerateResponse>().await?;
        extract_text(parsed)
    }
}

#[async_trait]
impl Generate for GeminiClient {
    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "generation failed, returning empty response");
                String::new()
            }
        }
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
    {
        return Err(LlmError::Blocked(reason.to_string()));
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}
