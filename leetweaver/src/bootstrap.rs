//! Wiring shared by the binaries: logging, collaborator construction and
//! run reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use leetweaver_sdk::log_aggregate_stats;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::judge::JudgeConnector;
use crate::ledger::ResultsLedger;
use crate::llm::Generate;
use crate::runner::CommandRunner;
use crate::solver::types::WorkflowState;
use crate::solver::workflow::{Orchestrator, WorkflowConfig};

/// Install the diagnostics subscriber. `RUST_LOG` wins over `debug`.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        "leetweaver=debug,chromiumoxide=warn"
    } else {
        "leetweaver=info,chromiumoxide=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "browser")]
pub fn build_connector(config: &Config) -> Result<Arc<dyn JudgeConnector>> {
    Ok(Arc::new(crate::judge::BrowserJudge::from_config(config)))
}

#[cfg(not(feature = "browser"))]
pub fn build_connector(_config: &Config) -> Result<Arc<dyn JudgeConnector>> {
    anyhow::bail!("this build has no judge backend; rebuild with the `browser` feature")
}

/// Assemble the orchestrator with the optional phases the config enables
pub fn build_orchestrator(
    llm: Arc<dyn Generate>,
    connector: Arc<dyn JudgeConnector>,
    config: &Config,
) -> Orchestrator {
    let orchestrator = Orchestrator::new(llm, connector, WorkflowConfig::from(config));
    match config
        .sandbox_command
        .as_deref()
        .and_then(|cmd| CommandRunner::from_command_line(cmd, config.sandbox_timeout))
    {
        Some(runner) => {
            tracing::info!(program = runner.program(), "local testing enabled");
            orchestrator.with_test_runner(Arc::new(runner))
        }
        None => orchestrator,
    }
}

pub fn ledger_path(config: &Config) -> PathBuf {
    config
        .results_file
        .clone()
        .unwrap_or_else(ResultsLedger::default_path)
}

/// Human-readable summary of a finished run
pub fn format_summary(state: &WorkflowState) -> String {
    let mut lines = vec![
        "--- LeetWeaver Run Summary ---".to_string(),
        format!("Problem: {} ({})", state.problem_title, state.problem_url),
        format!("Status: {}", state.status),
    ];
    if let Some(error) = &state.error_message {
        lines.push(format!("Details: {}", error));
    }
    if let Some(result) = &state.submission_results {
        let rendered = serde_json::to_string_pretty(result).unwrap_or_else(|_| result.status.to_string());
        lines.push(format!("Submission Result:\n{}", rendered));
    }
    lines.push(format!("Iterations: {}/{}", state.iteration, state.max_iterations));
    lines.join("\n")
}

/// Append a finished run to the ledger at `path` and print the totals
pub async fn record_run(path: &Path, state: &WorkflowState) -> Result<ResultsLedger> {
    let mut ledger = ResultsLedger::load(path).await?;
    ledger.record(state);
    ledger.save(path).await?;
    log_aggregate_stats!(
        ledger.statistics.total_attempted,
        ledger.statistics.total_solved,
        ledger.statistics.accuracy
    );
    Ok(ledger)
}
