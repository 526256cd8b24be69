//! Results ledger: one JSON document recording every solver run.
//!
//! Statistics are derived data and are recomputed on every load and save,
//! so a hand-edited file can never carry stale totals.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use leetweaver_sdk::{log_file_saved, log_state_file};

use crate::solver::types::{WorkflowState, WorkflowStatus};

const LEDGER_FILE_NAME: &str = "results.json";
const FALLBACK_LEDGER_PATH: &str = ".leetweaver-results.json";

/// One solver run as stored in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub problem_title: String,
    pub problem_url: String,
    pub status: WorkflowStatus,
    /// Coding attempts used
    pub attempts: usize,
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    /// Error message or final verdict, whichever explains the outcome
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total_attempted: usize,
    pub total_solved: usize,
    /// Percentage, two decimals
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsLedger {
    #[serde(default)]
    pub problems: Vec<ProblemRecord>,
    #[serde(default)]
    pub statistics: LedgerStatistics,
}

impl ResultsLedger {
    /// `<data dir>/leetweaver/results.json`, or a dotfile in the working
    /// directory when no home directory is known
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "leetweaver", "leetweaver")
            .map(|dirs| dirs.data_dir().join(LEDGER_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_LEDGER_PATH))
    }

    /// Load a ledger; a missing file yields an empty one
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read results ledger: {}", path.display()))?;
        let mut ledger: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse results ledger: {}", path.display()))?;
        ledger.recompute_statistics();
        Ok(ledger)
    }

    pub async fn save(&mut self, path: &Path) -> Result<()> {
        self.recompute_statistics();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize results ledger")?;
        fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write results ledger: {}", path.display()))?;

        log_file_saved!(path.display());
        log_state_file!(path.display(), "Results ledger");
        Ok(())
    }

    /// Append the outcome of a finished run
    pub fn record(&mut self, state: &WorkflowState) {
        let now = Utc::now();
        let duration_secs = (now - state.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let details = match (&state.error_message, &state.submission_results) {
            (Some(error), _) => Value::String(error.clone()),
            (None, Some(result)) => serde_json::to_value(result).unwrap_or(Value::Null),
            (None, None) => Value::Null,
        };

        self.problems.push(ProblemRecord {
            problem_title: state.problem_title.clone(),
            problem_url: state.problem_url.clone(),
            status: state.status,
            attempts: state.iteration,
            timestamp: now,
            duration_secs: (duration_secs * 100.0).round() / 100.0,
            details,
        });
        self.recompute_statistics();
    }

    pub fn recompute_statistics(&mut self) {
        let total_attempted = self.problems.len();
        let total_solved = self
            .problems
            .iter()
            .filter(|p| p.status == WorkflowStatus::Success)
            .count();
        let accuracy = if total_attempted == 0 {
            0.0
        } else {
            let pct = total_solved as f64 / total_attempted as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        };
        self.statistics = LedgerStatistics {
            total_attempted,
            total_solved,
            accuracy,
        };
    }

    /// Whether any recorded run of this URL ended in success
    pub fn is_solved(&self, url: &str) -> bool {
        let url = url.trim_end_matches('/');
        self.problems
            .iter()
            .any(|p| p.status == WorkflowStatus::Success && p.problem_url.trim_end_matches('/') == url)
    }
}
