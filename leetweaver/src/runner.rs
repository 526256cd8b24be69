//! Local test execution through an external sandbox command.
//!
//! Generated code never runs inside this process. The sandbox receives
//! `{language, code, cases}` as JSON on stdin and answers with a JSON
//! array of test results on stdout.

use std::process::Stdio;
use std::time::Duration;

use leetweaver_sdk::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::solver::types::{Language, TestCase, TestResult};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start sandbox '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("sandbox I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sandbox did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("sandbox exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("sandbox output is not a result list: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Executes candidate code against local test cases
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(
        &self,
        language: Language,
        code: &str,
        cases: &[TestCase],
    ) -> Result<Vec<TestResult>, RunnerError>;
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    language: &'a str,
    code: &'a str,
    cases: &'a [TestCase],
}

/// Runs a configured sandbox program once per batch of cases
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Split a whitespace-separated command line; `None` when blank
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl TestRunner for CommandRunner {
    async fn run(
        &self,
        language: Language,
        code: &str,
        cases: &[TestCase],
    ) -> Result<Vec<TestResult>, RunnerError> {
        let request = serde_json::to_vec(&RunRequest {
            language: language.fence_tag(),
            code,
            cases,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(program = %self.program, cases = cases.len(), "running sandbox");

        // The request may exceed the pipe buffer, so feeding stdin and
        // collecting output share one deadline.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&request).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = tokio::time::timeout(self.timeout, async move {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| RunnerError::Timeout(self.timeout))?;

        match fed {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(program = %self.program, "sandbox closed stdin early");
            }
            other => other?,
        }
        let output = output?;

        if !output.status.success() {
            return Err(RunnerError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let results: Vec<TestResult> = serde_json::from_slice(&output.stdout)?;
        Ok(results)
    }
}
