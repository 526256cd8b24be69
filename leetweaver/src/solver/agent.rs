//! Shared agent plumbing: the phase agent trait and prompt execution with
//! structured start/complete/failed events.

use leetweaver_sdk::{async_trait, log_agent_complete, log_agent_failed, log_agent_start};

use crate::llm::Generate;
use crate::solver::types::WorkflowState;

/// A phase agent reads and mutates the workflow state.
///
/// Agents never return errors: generation problems are recorded in
/// `state.error_message`, missing inputs move `state.status` to `Failed`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, state: &mut WorkflowState);
}

/// Send a prompt and report the exchange as agent events
///
/// # Returns
/// The response text, or `None` when the backend produced nothing.
pub async fn execute_prompt(
    llm: &dyn Generate,
    state: &WorkflowState,
    agent_name: &str,
    description: &str,
    prompt: &str,
) -> Option<String> {
    log_agent_start!(&state.run_id, agent_name, description);
    tracing::debug!(agent = agent_name, prompt_chars = prompt.len(), "sending prompt");

    let response = llm.generate(prompt).await;
    if response.trim().is_empty() {
        log_agent_failed!(&state.run_id, agent_name, "empty response from generation backend");
        return None;
    }

    log_agent_complete!(&state.run_id, agent_name, format!("{} chars", response.len()));
    Some(response)
}
