//! CLI argument definitions for the solver binaries.
//!
//! Both binaries share [`SolverFlags`]; flags override values read from the
//! environment.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser};

use crate::config::Config;
use crate::judge::PROBLEM_URL_PREFIX;
use crate::solver::types::Language;

/// Options shared by the single-problem and batch binaries
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SolverFlags {
    /// Maximum coding attempts per problem (overrides MAX_ITERATIONS)
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Solution language (overrides TARGET_LANGUAGE)
    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Path to the results ledger (overrides RESULTS_FILE)
    #[arg(long, value_name = "PATH")]
    pub results_file: Option<PathBuf>,

    /// Sandbox command used for local testing (overrides SANDBOX_COMMAND)
    ///
    /// The command receives `{language, code, cases}` as JSON on stdin and
    /// must print a JSON array of test results.
    #[arg(long, value_name = "CMD")]
    pub sandbox_command: Option<String>,

    /// Run one optimization pass before the first submission
    #[arg(long)]
    pub optimize: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl SolverFlags {
    /// Apply flag overrides on top of an environment-derived config
    pub fn apply(&self, config: &mut Config) {
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(path) = &self.results_file {
            config.results_file = Some(path.clone());
        }
        if let Some(command) = self.sandbox_command.as_deref().filter(|c| !c.trim().is_empty()) {
            config.sandbox_command = Some(command.to_string());
        }
        if self.optimize {
            config.enable_optimization = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == Some(0) {
            anyhow::bail!("--max-iterations must be at least 1");
        }
        Ok(())
    }
}

/// Solve a single LeetCode problem end to end
#[derive(Parser, Debug, Clone)]
#[command(name = "leetweaver")]
#[command(about = "Solve a LeetCode problem with an LLM-driven plan/code/debug loop")]
#[command(version)]
pub struct Args {
    /// Problem URL, e.g. https://leetcode.com/problems/two-sum/
    pub url: String,

    #[command(flatten)]
    pub flags: SolverFlags,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        validate_problem_url(&self.url)?;
        self.flags.validate()
    }
}

/// Solve a list of problems one after another
#[derive(Parser, Debug, Clone)]
#[command(name = "batch-solver")]
#[command(about = "Solve LeetCode problems listed in a file, skipping ones already solved")]
#[command(version)]
pub struct BatchArgs {
    /// File with one problem URL per line (`#` starts a comment)
    #[arg(long, value_name = "FILE")]
    pub urls: PathBuf,

    /// Maximum problems to attempt (overrides MAX_PROBLEMS)
    #[arg(long, value_name = "N")]
    pub max_problems: Option<usize>,

    #[command(flatten)]
    pub flags: SolverFlags,
}

impl BatchArgs {
    pub fn validate(&self) -> Result<()> {
        self.flags.validate()
    }
}

pub fn validate_problem_url(url: &str) -> Result<()> {
    if !url.starts_with(PROBLEM_URL_PREFIX) {
        anyhow::bail!(
            "Invalid LeetCode problem URL '{}'. Expected a URL starting with {}",
            url,
            PROBLEM_URL_PREFIX
        );
    }
    if url[PROBLEM_URL_PREFIX.len()..].trim_matches('/').is_empty() {
        anyhow::bail!("Problem URL '{}' has no problem slug", url);
    }
    Ok(())
}

/// Read problem URLs from a list file's contents.
///
/// Blank lines and `#` comments are skipped; invalid URLs are reported and
/// dropped. Duplicates keep their first position.
pub fn parse_url_list(content: &str) -> (Vec<String>, Vec<String>) {
    let mut urls: Vec<String> = Vec::new();
    let mut rejected = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if validate_problem_url(line).is_err() {
            rejected.push(line.to_string());
        } else if !urls.iter().any(|u| u == line) {
            urls.push(line.to_string());
        }
    }
    (urls, rejected)
}
