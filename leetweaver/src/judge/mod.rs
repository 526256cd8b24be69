//! Judge interface: the web session that fetches problems and grades code.
//!
//! The orchestrator only sees the `JudgeConnector` / `JudgeSession` traits.
//! Retries with backoff live inside implementations; callers never retry.
//!
//! ## Module Structure
//!
//! - `browser` - Chromium-driven session (feature `browser`)

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::BrowserJudge;

use std::future::Future;
use std::time::Duration;

use leetweaver_sdk::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::solver::types::{Language, SubmissionResult, Verdict};

pub const LOGIN_URL: &str = "https://leetcode.com/accounts/login/";
pub const PROBLEM_URL_PREFIX: &str = "https://leetcode.com/problems/";

/// Default wait for page elements
pub const DEFAULT_WAIT: Duration = Duration::from_secs(40);
/// Wait for optional elements
pub const SHORT_WAIT: Duration = Duration::from_secs(10);
/// Wait for a terminal submission verdict
pub const VERDICT_WAIT: Duration = Duration::from_secs(40 * 5);
pub const RETRY_ATTEMPTS: usize = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {}s waiting for {what}", .after.as_secs())]
    Timeout { what: String, after: Duration },

    #[error("login failed: {0}")]
    Login(String),

    #[error("problem details unavailable for {0}")]
    ProblemUnavailable(String),

    #[error("could not select language {0}")]
    Language(String),

    #[error("code input failed: {0}")]
    CodeInput(String),

    #[error("submit failed: {0}")]
    Submit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problem statement and editor template scraped from the problem page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemDetails {
    pub title: Option<String>,
    pub description: String,
    pub starting_code: String,
}

/// Opens judge sessions. One session per problem run.
#[async_trait]
pub trait JudgeConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn JudgeSession>, JudgeError>;
}

/// A live, exclusively owned judge session
#[async_trait]
pub trait JudgeSession: Send {
    /// Idempotent; may block for manual intervention on an ambiguous page
    async fn login(&mut self) -> Result<(), JudgeError>;

    /// Fails only when neither description nor starting code can be read
    async fn get_problem_details(&mut self, url: &str) -> Result<ProblemDetails, JudgeError>;

    async fn ensure_language_is(&mut self, language: Language) -> Result<(), JudgeError>;

    async fn input_code(&mut self, code: &str) -> Result<(), JudgeError>;

    async fn submit(&mut self) -> Result<(), JudgeError>;

    /// Waits up to `VERDICT_WAIT` for a terminal verdict
    async fn get_submission_verdict(&mut self) -> Result<SubmissionResult, JudgeError>;

    /// Run the editor code against the statement's examples without submitting
    async fn run_example_tests(&mut self) -> Result<(), JudgeError> {
        Err(JudgeError::Submit("example runs are not supported by this judge".to_string()))
    }

    /// Console result of the last `run_example_tests`
    async fn get_run_results(&mut self) -> Result<SubmissionResult, JudgeError> {
        Err(JudgeError::Submit("example runs are not supported by this judge".to_string()))
    }

    /// Release the underlying browser
    async fn close(&mut self) -> Result<(), JudgeError>;
}

/// Result panel fields shown for a rejected submission
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultPanel {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

impl ResultPanel {
    fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.expected.is_none() && self.stderr.is_none()
    }
}

/// Build a submission result from the verdict banner and result panel.
///
/// Panel fields are also copied into the flat keys the debugger looks for
/// first (`last_testcase`, `expected_output`, `runtime_error`, ...).
pub fn build_submission_result(
    status_text: &str,
    runtime: Option<String>,
    memory: Option<String>,
    panel: ResultPanel,
) -> SubmissionResult {
    let verdict = Verdict::from_status_text(status_text);
    let mut result = SubmissionResult::new(verdict);

    if verdict.is_accepted() {
        result.runtime = runtime;
        result.memory = memory;
        return result;
    }

    if verdict == Verdict::Unknown && !status_text.trim().is_empty() {
        result = result.with_field("raw_status", status_text.trim());
    }

    if panel.is_empty() {
        if !status_text.trim().is_empty() {
            result.details = Some(status_text.trim().into());
        }
        return result;
    }

    if let Some(input) = &panel.input {
        result = result.with_field("last_testcase", input.as_str());
    }
    if let Some(expected) = &panel.expected {
        result = result.with_field("expected_output", expected.as_str());
    }
    if let Some(output) = &panel.output {
        result = result.with_field("actual_output", output.as_str());
    }
    if let Some(stderr) = &panel.stderr {
        let key = match verdict {
            Verdict::CompileError => "compile_error",
            Verdict::RuntimeError => "runtime_error",
            _ => "error_message",
        };
        result = result.with_field(key, stderr.as_str());
    }

    let mut details = serde_json::Map::new();
    for (key, value) in [
        ("input", &panel.input),
        ("output", &panel.output),
        ("expected", &panel.expected),
        ("stderr", &panel.stderr),
    ] {
        if let Some(value) = value {
            details.insert(key.to_string(), value.clone().into());
        }
    }
    result.details = Some(details.into());
    result
}

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
///
/// # Returns
/// The first success, or the last error once attempts are exhausted.
pub async fn with_retries<T, F, Fut>(
    what: &str,
    attempts: usize,
    delay: Duration,
    mut op: F,
) -> Result<T, JudgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JudgeError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!(what, attempt, error = %e, "judge operation failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
