use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export async trait for convenience
pub use async_trait::async_trait;

/// Generate a fresh identifier for one solver run
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Structured logging events emitted by solver runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowLog {
    /// Run started for one problem
    RunStarted {
        run_id: String,
        problem_url: String,
        max_iterations: usize,
    },
    /// Phase started
    PhaseStarted {
        run_id: String,
        iteration: usize,
        phase: String,
    },
    /// Phase completed, with the phase the machine moves to next
    PhaseCompleted {
        run_id: String,
        iteration: usize,
        phase: String,
        next: String,
    },
    /// Phase failed
    PhaseFailed {
        run_id: String,
        iteration: usize,
        phase: String,
        error: String,
    },
    /// Agent started
    AgentStarted {
        run_id: String,
        agent_name: String,
        description: String,
    },
    /// Agent completed
    AgentCompleted {
        run_id: String,
        agent_name: String,
        result: Option<String>,
    },
    /// Agent failed
    AgentFailed {
        run_id: String,
        agent_name: String,
        error: String,
    },
    /// Verdict read back from the judge
    SubmissionVerdict {
        run_id: String,
        iteration: usize,
        verdict: String,
        runtime: Option<String>,
        memory: Option<String>,
    },
    /// Run reached a terminal state
    RunFinished {
        run_id: String,
        status: String,
        iterations: usize,
        error: Option<String>,
    },
    /// State file written (results ledger)
    StateFileCreated {
        file_path: String,
        description: String,
    },
}

impl WorkflowLog {
    /// Emit this log event to stderr for machine consumers
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("__WF_EVENT__:{}", json);
            let _ = std::io::stderr().flush();
        }
    }
}

/// Helper macros for workflow logging
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $url:expr, $max:expr) => {
        $crate::WorkflowLog::RunStarted {
            run_id: $run_id.to_string(),
            problem_url: $url.to_string(),
            max_iterations: $max,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_start {
    ($run_id:expr, $iteration:expr, $phase:expr) => {
        $crate::WorkflowLog::PhaseStarted {
            run_id: $run_id.to_string(),
            iteration: $iteration,
            phase: $phase.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_complete {
    ($run_id:expr, $iteration:expr, $phase:expr, $next:expr) => {
        $crate::WorkflowLog::PhaseCompleted {
            run_id: $run_id.to_string(),
            iteration: $iteration,
            phase: $phase.to_string(),
            next: $next.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_failed {
    ($run_id:expr, $iteration:expr, $phase:expr, $error:expr) => {
        $crate::WorkflowLog::PhaseFailed {
            run_id: $run_id.to_string(),
            iteration: $iteration,
            phase: $phase.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_start {
    ($run_id:expr, $agent:expr, $desc:expr) => {
        $crate::WorkflowLog::AgentStarted {
            run_id: $run_id.to_string(),
            agent_name: $agent.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_complete {
    ($run_id:expr, $agent:expr) => {
        $crate::WorkflowLog::AgentCompleted {
            run_id: $run_id.to_string(),
            agent_name: $agent.to_string(),
            result: None,
        }
        .emit();
    };
    ($run_id:expr, $agent:expr, $result:expr) => {
        $crate::WorkflowLog::AgentCompleted {
            run_id: $run_id.to_string(),
            agent_name: $agent.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_failed {
    ($run_id:expr, $agent:expr, $error:expr) => {
        $crate::WorkflowLog::AgentFailed {
            run_id: $run_id.to_string(),
            agent_name: $agent.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_submission_verdict {
    ($run_id:expr, $iteration:expr, $verdict:expr, $runtime:expr, $memory:expr) => {
        $crate::WorkflowLog::SubmissionVerdict {
            run_id: $run_id.to_string(),
            iteration: $iteration,
            verdict: $verdict.to_string(),
            runtime: $runtime,
            memory: $memory,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_run_finished {
    ($run_id:expr, $status:expr, $iterations:expr, $error:expr) => {
        $crate::WorkflowLog::RunFinished {
            run_id: $run_id.to_string(),
            status: $status.to_string(),
            iterations: $iterations,
            error: $error,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_state_file {
    ($path:expr, $desc:expr) => {
        $crate::WorkflowLog::StateFileCreated {
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// These macros provide colored console output for human-readable logs,
// complementing the structured WorkflowLog events above.
// ============================================================================

/// Logs the start of a solver phase with a header and description.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_phase_start_console;
/// log_phase_start_console!(1, "Coding", "Generate a candidate solution");
/// ```
///
/// Outputs:
/// ```text
/// ═══ ITERATION 1: Coding ═══
/// Generate a candidate solution
/// ```
#[macro_export]
macro_rules! log_phase_start_console {
    ($iteration:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ ITERATION {}: {} ═══\x1b[0m", $iteration, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a solver phase.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_phase_complete_console;
/// log_phase_complete_console!("Planning");
/// ```
///
/// Outputs:
/// ```text
/// ✓ Planning complete
/// ```
#[macro_export]
macro_rules! log_phase_complete_console {
    ($phase:expr) => {
        println!("\x1b[32m✓ {} complete\x1b[0m", $phase);
    };
}

/// Logs a judge verdict, green when accepted and red otherwise.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_verdict;
/// log_verdict!("Wrong Answer", false);
/// ```
///
/// Outputs:
/// ```text
/// ✗ Verdict: Wrong Answer
/// ```
#[macro_export]
macro_rules! log_verdict {
    ($verdict:expr, $accepted:expr) => {
        if $accepted {
            println!("\x1b[1;32m✓ Verdict: {}\x1b[0m", $verdict);
        } else {
            println!("\x1b[1;31m✗ Verdict: {}\x1b[0m", $verdict);
        }
    };
}

/// Logs local test results.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_test_summary;
/// log_test_summary!(4, 1);
/// ```
///
/// Outputs:
/// ```text
/// Local tests: ✓ 4 passed, ✗ 1 failed
/// ```
#[macro_export]
macro_rules! log_test_summary {
    ($passed:expr, $failed:expr) => {
        println!(
            "\x1b[1mLocal tests: \x1b[32m✓ {} passed\x1b[0m, \x1b[31m✗ {} failed\x1b[0m",
            $passed, $failed
        );
    };
}

/// Logs progress of an operation.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_progress;
/// log_progress!(3, 5, "problems");
/// ```
///
/// Outputs:
/// ```text
/// Progress: 3/5 problems
/// ```
#[macro_export]
macro_rules! log_progress {
    ($current:expr, $total:expr, $item_type:expr) => {
        println!(
            "\x1b[36mProgress: {}/{} {}\x1b[0m",
            $current, $total, $item_type
        );
    };
}

/// Logs aggregate ledger statistics.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_aggregate_stats;
/// log_aggregate_stats!(10, 7, 70.0);
/// ```
///
/// Outputs:
/// ```text
/// Total: 10 attempted, 7 solved, 70.0% accuracy
/// ```
#[macro_export]
macro_rules! log_aggregate_stats {
    ($attempted:expr, $solved:expr, $accuracy:expr) => {
        println!(
            "\x1b[1mTotal: {} attempted, {} solved, {:.1}% accuracy\x1b[0m",
            $attempted, $solved, $accuracy
        );
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_info;
/// log_info!("Fetching problem details...");
/// ```
///
/// Outputs:
/// ```text
/// ℹ Fetching problem details...
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_warning;
/// log_warning!("Plan is missing, coding from the description only");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: Plan is missing, coding from the description only
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs an error message.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_error;
/// let limit = 5;
/// log_error!("Max iterations ({}) reached without success.", limit);
/// ```
///
/// Outputs:
/// ```text
/// ✗ Error: Max iterations (5) reached without success.
/// ```
#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        println!("\x1b[31m✗ Error: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[31m✗ Error: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use leetweaver_sdk::log_file_saved;
/// log_file_saved!("./results.json");
/// ```
///
/// Outputs:
/// ```text
/// ✓ Saved: ./results.json
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}

/// Logs a debug message (intended to be used conditionally).
///
/// # Example
/// ```
/// use leetweaver_sdk::log_debug;
/// log_debug!("Extracted code block");
/// let count = 3;
/// log_debug!("Parsed {} constraints", count);
/// ```
///
/// Outputs:
/// ```text
/// [DEBUG] Extracted code block
/// [DEBUG] Parsed 3 constraints
/// ```
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

// ============================================================================
// End of Console Logging Macros
// ============================================================================
