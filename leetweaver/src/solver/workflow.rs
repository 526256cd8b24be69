//! Workflow orchestration for the solver
//!
//! This module contains the state machine that drives one problem from
//! statement to verdict: Planning, Coding, optional Testing and Optimizing,
//! Submitting, and Debugging on rejection. It owns the judge session for the
//! whole run and decides every transition; the phase agents only mutate state.
//!
//! The primary entry point is [`Orchestrator::run`], which never fails: every
//! error, including a panic inside a phase, ends the run in `Failed` with an
//! explanatory `error_message`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::FutureExt;

use leetweaver_sdk::{
    log_error, log_info, log_phase_complete, log_phase_complete_console, log_phase_failed,
    log_phase_start, log_phase_start_console, log_run_finished, log_run_start, log_submission_verdict,
    log_verdict, log_warning,
};

use crate::config::{Config, DEFAULT_MAX_ITERATIONS};
use crate::judge::{JudgeConnector, JudgeSession};
use crate::llm::Generate;
use crate::runner::TestRunner;
use crate::solver::agent::Agent;
use crate::solver::phase0_analyze::AnalyzerAgent;
use crate::solver::phase1_code::CodingAgent;
use crate::solver::phase2_test::TestingAgent;
use crate::solver::phase3_debug::DebuggingAgent;
use crate::solver::phase4_optimize::OptimizationAgent;
use crate::solver::types::{Language, WorkflowState, WorkflowStatus};

pub const STUCK_LOOP_MESSAGE: &str = "Coding agent stuck in a loop - unable to generate new code.";

/// Configuration for one solver run
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Coding attempts allowed before giving up
    pub max_iterations: usize,
    pub language: Language,
    /// Run the Optimizing phase once before the first submission
    pub enable_optimization: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            language: Language::default(),
            enable_optimization: false,
        }
    }
}

impl From<&Config> for WorkflowConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_iterations: config.max_iterations,
            language: config.language,
            enable_optimization: config.enable_optimization,
        }
    }
}

/// Drives the phase agents and the judge session for one problem at a time.
///
/// Build it once and reuse it across problems; each [`run`](Self::run)
/// opens and closes its own judge session.
pub struct Orchestrator {
    llm: Arc<dyn Generate>,
    connector: Arc<dyn JudgeConnector>,
    analyzer: Arc<dyn Agent>,
    coder: Arc<dyn Agent>,
    debugger: Arc<dyn Agent>,
    tester: Option<Arc<dyn Agent>>,
    optimizer: Option<Arc<dyn Agent>>,
    config: WorkflowConfig,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn Generate>,
        connector: Arc<dyn JudgeConnector>,
        config: WorkflowConfig,
    ) -> Self {
        let optimizer = config
            .enable_optimization
            .then(|| Arc::new(OptimizationAgent::new(llm.clone())) as Arc<dyn Agent>);
        Self {
            analyzer: Arc::new(AnalyzerAgent::new(llm.clone())),
            coder: Arc::new(CodingAgent::new(llm.clone())),
            debugger: Arc::new(DebuggingAgent::new(llm.clone())),
            tester: None,
            optimizer,
            llm,
            connector,
            config,
        }
    }

    /// Enable the Testing phase with the given sandbox runner
    pub fn with_test_runner(mut self, runner: Arc<dyn TestRunner>) -> Self {
        self.tester = Some(Arc::new(TestingAgent::new(self.llm.clone(), runner)));
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Solve one problem.
    ///
    /// # Returns
    /// The final state, always in `Success` or `Failed`.
    pub async fn run(&self, problem_url: &str) -> WorkflowState {
        let mut state = WorkflowState::new(problem_url, self.config.max_iterations, self.config.language);
        log_run_start!(state.run_id, problem_url, state.max_iterations);
        log_info!("Starting workflow for {}", problem_url);

        match self.connector.connect().await {
            Ok(mut session) => {
                let outcome = AssertUnwindSafe(self.drive(session.as_mut(), &mut state))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        log_error!("{:#}", e);
                        state.fail(format!("{:#}", e));
                    }
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        log_error!("Orchestrator error: {}", message);
                        state.fail(format!("Orchestrator error: {}", message));
                    }
                }

                if let Err(e) = session.close().await {
                    tracing::warn!(error = %e, "failed to close judge session");
                }
            }
            Err(e) => {
                log_error!("Failed to start judge session: {}", e);
                state.fail(format!("Failed to start judge session: {}", e));
            }
        }

        if !state.status.is_terminal() {
            state.fail("Workflow ended without reaching a terminal state.");
        }

        log_run_finished!(
            state.run_id,
            state.status.as_str(),
            state.iteration,
            state.error_message.clone()
        );
        state
    }

    async fn drive(&self, session: &mut dyn JudgeSession, state: &mut WorkflowState) -> Result<()> {
        session.login().await.context("Judge login failed")?;

        let details = session
            .get_problem_details(&state.problem_url)
            .await
            .with_context(|| format!("Failed to retrieve problem details from {}", state.problem_url))?;

        if let Some(title) = details.title {
            state.problem_title = title;
        }
        state.problem_description = Some(details.description).filter(|d| !d.trim().is_empty());
        state.starting_code = Some(details.starting_code).filter(|c| !c.trim().is_empty());
        state.current_code = state.starting_code.clone();
        log_info!("Problem: {}", state.problem_title);

        state.status = WorkflowStatus::Planning;
        while !state.status.is_terminal() {
            self.advance(session, state).await;
        }
        Ok(())
    }

    /// Run the current phase and apply the resulting transition.
    ///
    /// Exposed so a run can be resumed or inspected one phase at a time.
    pub async fn advance(&self, session: &mut dyn JudgeSession, state: &mut WorkflowState) {
        let phase = state.status;
        log_phase_start!(state.run_id, state.iteration, phase.as_str());

        let requested = match phase {
            WorkflowStatus::Initialized => WorkflowStatus::Planning,
            WorkflowStatus::Planning => self.plan(state).await,
            WorkflowStatus::Coding => self.code(state).await,
            WorkflowStatus::Testing => self.test(state).await,
            WorkflowStatus::Optimizing => self.optimize(state).await,
            WorkflowStatus::Submitting => self.submit(session, state).await,
            WorkflowStatus::Debugging => self.debug(state).await,
            WorkflowStatus::Success | WorkflowStatus::Failed => return,
        };

        // An agent may already have failed the run
        let requested = if state.status == WorkflowStatus::Failed {
            WorkflowStatus::Failed
        } else {
            requested
        };
        let next = self.gate(state, requested);
        state.status = next;

        if next == WorkflowStatus::Failed {
            let error = state.error_message.clone().unwrap_or_default();
            log_error!("{} failed: {}", phase, error);
            log_phase_failed!(state.run_id, state.iteration, phase.as_str(), error);
        } else {
            log_phase_complete_console!(phase);
            log_phase_complete!(state.run_id, state.iteration, phase.as_str(), next.as_str());
        }
    }

    /// Refuse to start another attempt once the iteration budget is spent
    fn gate(&self, state: &mut WorkflowState, next: WorkflowStatus) -> WorkflowStatus {
        let starts_attempt = matches!(next, WorkflowStatus::Coding | WorkflowStatus::Debugging);
        if starts_attempt && state.iteration >= state.max_iterations {
            state.fail(format!(
                "Max iterations ({}) reached without success.",
                state.max_iterations
            ));
            return WorkflowStatus::Failed;
        }
        next
    }

    fn optimization_pending(&self, state: &WorkflowState) -> bool {
        self.optimizer.is_some() && !state.optimization_done
    }

    async fn plan(&self, state: &mut WorkflowState) -> WorkflowStatus {
        log_phase_start_console!(state.iteration, "Planning", "Analyzing the problem and drafting a plan");
        self.analyzer.execute(state).await;
        if state.status == WorkflowStatus::Failed {
            return WorkflowStatus::Failed;
        }

        if state.plan.is_none() {
            let message = state
                .error_message
                .clone()
                .unwrap_or_else(|| "Planning phase failed (no plan generated).".to_string());
            state.fail(message);
            return WorkflowStatus::Failed;
        }
        WorkflowStatus::Coding
    }

    async fn code(&self, state: &mut WorkflowState) -> WorkflowStatus {
        state.iteration += 1;
        log_phase_start_console!(
            state.iteration,
            "Coding",
            format!("Attempt {} of {}", state.iteration, state.max_iterations)
        );

        let previous = state.current_code.clone();
        let guided = state.debug_analysis.is_some() || state.optimization_analysis.is_some();

        self.coder.execute(state).await;
        if state.status == WorkflowStatus::Failed {
            return WorkflowStatus::Failed;
        }

        let has_code = state
            .current_code
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if let Some(error) = state.error_message.clone() {
            if !has_code {
                state.fail(error);
                return WorkflowStatus::Failed;
            }
            log_warning!("{} Continuing with the existing code.", error);
        }

        if state.iteration > 1 && !guided && state.current_code == previous {
            state.fail(STUCK_LOOP_MESSAGE);
            return WorkflowStatus::Failed;
        }

        state.debug_analysis = None;
        state.optimization_analysis = None;

        if self.tester.is_some() {
            WorkflowStatus::Testing
        } else if self.optimization_pending(state) {
            WorkflowStatus::Optimizing
        } else {
            WorkflowStatus::Submitting
        }
    }

    async fn test(&self, state: &mut WorkflowState) -> WorkflowStatus {
        let Some(tester) = &self.tester else {
            return WorkflowStatus::Submitting;
        };
        log_phase_start_console!(state.iteration, "Testing", "Running local test cases");
        tester.execute(state).await;
        if state.status == WorkflowStatus::Failed {
            return WorkflowStatus::Failed;
        }

        if !state.failed_tests().is_empty() {
            // A stale verdict would outrank the local failures in the debugger
            state.submission_results = None;
            return WorkflowStatus::Debugging;
        }

        if self.optimization_pending(state) {
            WorkflowStatus::Optimizing
        } else {
            WorkflowStatus::Submitting
        }
    }

    async fn optimize(&self, state: &mut WorkflowState) -> WorkflowStatus {
        let Some(optimizer) = &self.optimizer else {
            return WorkflowStatus::Submitting;
        };
        log_phase_start_console!(state.iteration, "Optimizing", "Reviewing time and space complexity");

        let before = state.current_code.clone();
        optimizer.execute(state).await;
        if state.status == WorkflowStatus::Failed {
            return WorkflowStatus::Failed;
        }

        if state.current_code != before {
            return if self.tester.is_some() {
                WorkflowStatus::Testing
            } else {
                WorkflowStatus::Submitting
            };
        }

        if state.optimization_analysis.is_some() {
            if state.iteration < state.max_iterations {
                return WorkflowStatus::Coding;
            }
            log_warning!("No iterations left to apply the optimization analysis. Submitting as is.");
            state.optimization_analysis = None;
        }
        WorkflowStatus::Submitting
    }

    async fn submit(&self, session: &mut dyn JudgeSession, state: &mut WorkflowState) -> WorkflowStatus {
        log_phase_start_console!(state.iteration, "Submitting", "Sending the solution to the judge");

        let Some(code) = state.current_code.clone().filter(|c| !c.trim().is_empty()) else {
            state.fail("No code available to submit.");
            return WorkflowStatus::Failed;
        };

        if let Err(e) = session.ensure_language_is(state.language).await {
            tracing::error!(error = %e, "language selection failed");
            state.fail(format!("Failed to set {} language for submission.", state.language));
            return WorkflowStatus::Failed;
        }
        if let Err(e) = session.input_code(&code).await {
            tracing::error!(error = %e, "code input failed");
            state.fail("Failed to input code into editor for submission (interface error).");
            return WorkflowStatus::Failed;
        }
        if let Err(e) = session.submit().await {
            tracing::error!(error = %e, "submit failed");
            state.fail("Failed to click submit button (interface error).");
            return WorkflowStatus::Failed;
        }

        let result = match session.get_submission_verdict().await {
            Ok(result) => result,
            Err(e) => {
                state.fail(format!("Failed to retrieve submission verdict: {}", e));
                return WorkflowStatus::Failed;
            }
        };

        let accepted = result.status.is_accepted();
        log_submission_verdict!(
            state.run_id,
            state.iteration,
            result.status.as_str(),
            result.runtime.clone(),
            result.memory.clone()
        );
        log_verdict!(result.status, accepted);
        state.submission_results = Some(result);

        if accepted {
            state.error_message = None;
            WorkflowStatus::Success
        } else {
            state.test_results = None;
            WorkflowStatus::Debugging
        }
    }

    async fn debug(&self, state: &mut WorkflowState) -> WorkflowStatus {
        log_phase_start_console!(state.iteration, "Debugging", "Analyzing the failure");

        let before = state.current_code.clone();
        state.debug_analysis = None;
        self.debugger.execute(state).await;
        if state.status == WorkflowStatus::Failed {
            return WorkflowStatus::Failed;
        }

        if state.debug_analysis.is_none() && state.current_code == before {
            let message = state
                .error_message
                .clone()
                .unwrap_or_else(|| "Debugging failed to produce results.".to_string());
            state.fail(message);
            return WorkflowStatus::Failed;
        }
        WorkflowStatus::Coding
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
