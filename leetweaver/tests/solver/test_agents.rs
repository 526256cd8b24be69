//! Tests for the individual phase agents

use std::sync::Arc;

use leetweaver::solver::agent::Agent;
use leetweaver::solver::phase0_analyze::AnalyzerAgent;
use leetweaver::solver::phase1_code::{coding_prompt, CodingAgent};
use leetweaver::solver::phase2_test::TestingAgent;
use leetweaver::solver::phase3_debug::{DebuggingAgent, NO_SPECIFIC_ANALYSIS};
use leetweaver::solver::phase4_optimize::OptimizationAgent;
use leetweaver::solver::types::*;

use super::common::*;

// ============================================================================
// Analyzer
// ============================================================================

#[tokio::test]
async fn test_analyzer_sets_plan_and_constraints() {
    let llm = ScriptedLlm::new([analysis_response()]);
    let agent = AnalyzerAgent::new(llm.clone());
    let mut state = loaded_state(5);

    agent.execute(&mut state).await;

    assert!(state.plan.as_deref().unwrap().starts_with("1. Walk the array"));
    assert_eq!(state.constraints.as_ref().unwrap().len(), 2);
    assert!(state.error_message.is_none());
    assert!(llm.prompts()[0].contains(TWO_SUM_DESCRIPTION));
}

#[tokio::test]
async fn test_analyzer_without_description_fails_run() {
    let llm = ScriptedLlm::new([analysis_response()]);
    let agent = AnalyzerAgent::new(llm.clone());
    let mut state = loaded_state(5);
    state.problem_description = None;

    agent.execute(&mut state).await;

    assert_eq!(state.status, WorkflowStatus::Failed);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Problem Analyzer & Planner: Problem description is missing.")
    );
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_analyzer_empty_response_leaves_plan_unset() {
    let llm = ScriptedLlm::new([""]);
    let agent = AnalyzerAgent::new(llm);
    let mut state = loaded_state(5);

    agent.execute(&mut state).await;

    assert!(state.plan.is_none());
    assert_ne!(state.status, WorkflowStatus::Failed);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Problem Analyzer & Planner: LLM analysis failed to produce a result.")
    );
}

#[tokio::test]
async fn test_analyzer_unstructured_response_becomes_plan() {
    let llm = ScriptedLlm::new(["Use a hash map keyed by value."]);
    let agent = AnalyzerAgent::new(llm);
    let mut state = loaded_state(5);

    agent.execute(&mut state).await;

    assert_eq!(state.plan.as_deref(), Some("Use a hash map keyed by value."));
    assert_eq!(state.constraints, Some(vec!["Parsing failed.".to_string()]));
}

// ============================================================================
// Coder
// ============================================================================

#[tokio::test]
async fn test_coder_replaces_code_and_clears_error() {
    let llm = ScriptedLlm::new([code_response(SOLUTION_V1)]);
    let agent = CodingAgent::new(llm.clone());
    let mut state = loaded_state(5);
    state.error_message = Some("stale".to_string());

    agent.execute(&mut state).await;

    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V1));
    assert!(state.error_message.is_none());

    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("Starting Code Template"));
    assert!(prompt.contains(STARTING_CODE));
    assert!(prompt.contains("```python"));
}

#[tokio::test]
async fn test_coder_keeps_previous_code_when_extraction_fails() {
    let llm = ScriptedLlm::new(["Sorry, I cannot solve this one."]);
    let agent = CodingAgent::new(llm);
    let mut state = loaded_state(5);

    agent.execute(&mut state).await;

    assert_eq!(state.current_code.as_deref(), Some(STARTING_CODE));
    assert_eq!(
        state.error_message.as_deref(),
        Some("Coding Agent: Failed to extract code from LLM response.")
    );
    assert_ne!(state.status, WorkflowStatus::Failed);
}

#[tokio::test]
async fn test_coder_empty_response() {
    let llm = ScriptedLlm::new(Vec::<String>::new());
    let agent = CodingAgent::new(llm);
    let mut state = loaded_state(5);

    agent.execute(&mut state).await;

    assert_eq!(
        state.error_message.as_deref(),
        Some("Coding Agent: LLM failed to generate code.")
    );
}

#[tokio::test]
async fn test_coder_without_description_fails_run() {
    let llm = ScriptedLlm::new([code_response(SOLUTION_V1)]);
    let agent = CodingAgent::new(llm.clone());
    let mut state = loaded_state(5);
    state.problem_description = Some(String::new());

    agent.execute(&mut state).await;

    assert_eq!(state.status, WorkflowStatus::Failed);
    assert_eq!(llm.calls(), 0);
}

#[test]
fn test_coding_prompt_carries_debug_feedback() {
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());
    state.debug_analysis = Some("j must start at i + 1".to_string());

    let prompt = coding_prompt(&state);
    assert!(prompt.contains("Debugging Analysis from previous attempt:"));
    assert!(prompt.contains("j must start at i + 1"));
    assert!(prompt.contains("Previous Code with bugs:"));
    assert!(prompt.contains(SOLUTION_V1));
}

#[test]
fn test_coding_prompt_warns_without_template() {
    let mut state = loaded_state(5);
    state.starting_code = None;
    let prompt = coding_prompt(&state);
    assert!(prompt.contains("No starting code template provided"));
    assert!(!prompt.contains("Starting Code Template (Your solution MUST use this structure):"));
}

// ============================================================================
// Debugger
// ============================================================================

#[tokio::test]
async fn test_debugger_applies_corrected_code() {
    let llm = ScriptedLlm::new([fix_response(
        "Sure, I can help with that.\nThe inner loop reuses index i.",
        SOLUTION_V2,
    )]);
    let agent = DebuggingAgent::new(llm.clone());
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());
    state.submission_results = Some(wrong_answer());

    agent.execute(&mut state).await;

    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V2));
    assert_eq!(state.debug_analysis.as_deref(), Some("The inner loop reuses index i."));
    assert!(state.error_message.is_none());

    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("The code failed submission with the following result:"));
    assert!(prompt.contains("- Expected Output: [0,1]"));
    assert!(prompt.contains(SOLUTION_V1));
}

#[tokio::test]
async fn test_debugger_without_failure_context_skips_llm() {
    let llm = ScriptedLlm::new(["unused"]);
    let agent = DebuggingAgent::new(llm.clone());
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());

    agent.execute(&mut state).await;

    assert_eq!(llm.calls(), 0);
    assert!(state.debug_analysis.is_none());
    assert_eq!(
        state.error_message.as_deref(),
        Some("Debugging Agent: No failure context provided.")
    );
}

#[tokio::test]
async fn test_debugger_without_code_fails_run() {
    let llm = ScriptedLlm::new(["unused"]);
    let agent = DebuggingAgent::new(llm);
    let mut state = loaded_state(5);
    state.current_code = None;
    state.submission_results = Some(wrong_answer());

    agent.execute(&mut state).await;

    assert_eq!(state.status, WorkflowStatus::Failed);
    assert_eq!(state.error_message.as_deref(), Some("Debugging Agent: Current code missing."));
}

#[tokio::test]
async fn test_debugger_code_only_response_gets_default_analysis() {
    let llm = ScriptedLlm::new([code_response(SOLUTION_V2)]);
    let agent = DebuggingAgent::new(llm);
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());
    state.test_results = Some(vec![failed("edge_dup")]);

    agent.execute(&mut state).await;

    assert_eq!(state.debug_analysis.as_deref(), Some(NO_SPECIFIC_ANALYSIS));
    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V2));
}

// ============================================================================
// Tester
// ============================================================================

#[tokio::test]
async fn test_tester_runs_examples_and_generated_cases() {
    let generated = r#"```json
[{"id": "edge_dup", "input": [[3, 3], 6], "expected_output": [0, 1]}]
```"#;
    let llm = ScriptedLlm::new([generated]);
    let runner = MockRunner::new([Ok(vec![passed("example_1"), failed("edge_dup")])]);
    let agent = TestingAgent::new(llm, runner.clone());
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());

    agent.execute(&mut state).await;

    let runs = runner.runs();
    assert_eq!(runs.len(), 1);
    let ids: Vec<&str> = runs[0].iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["example_1", "edge_dup"]);

    assert_eq!(state.test_cases.as_ref().unwrap().len(), 2);
    assert_eq!(state.test_results.as_ref().unwrap().len(), 2);
    assert_eq!(state.failed_tests().len(), 1);
    assert!(state.error_message.is_none());
}

#[tokio::test]
async fn test_tester_records_runner_failure() {
    let llm = ScriptedLlm::new(["[]"]);
    let runner = MockRunner::new([Err("SyntaxError: invalid syntax".to_string())]);
    let agent = TestingAgent::new(llm, runner);
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V1.to_string());
    state.test_results = Some(vec![passed("old")]);

    agent.execute(&mut state).await;

    assert!(state.test_results.is_none());
    let error = state.error_message.unwrap();
    assert!(error.starts_with("Testing Agent: Exception during code execution - "));
    assert!(error.contains("SyntaxError"));
}

#[tokio::test]
async fn test_tester_without_cases_skips_runner() {
    let llm = ScriptedLlm::new(["no idea"]);
    let runner = MockRunner::new(Vec::new());
    let agent = TestingAgent::new(llm, runner.clone());
    let mut state = loaded_state(5);
    state.problem_description = Some("Return any valid answer.".to_string());
    state.current_code = Some(SOLUTION_V1.to_string());

    agent.execute(&mut state).await;

    assert!(runner.runs().is_empty());
    assert_eq!(state.test_results, Some(Vec::new()));
}

// ============================================================================
// Optimizer
// ============================================================================

#[tokio::test]
async fn test_optimizer_replaces_code_once() {
    let llm = ScriptedLlm::new([fix_response("Nested loops are O(n^2); a hash map is O(n).", SOLUTION_V3)]);
    let agent = OptimizationAgent::new(llm);
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V2.to_string());

    agent.execute(&mut state).await;

    assert!(state.optimization_done);
    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V3));
    assert_eq!(
        state.optimization_analysis.as_deref(),
        Some("Nested loops are O(n^2); a hash map is O(n).")
    );
}

#[tokio::test]
async fn test_optimizer_ignores_identical_code() {
    let llm = ScriptedLlm::new([fix_response("Already optimal.", &format!("  {}  ", SOLUTION_V3))]);
    let agent = OptimizationAgent::new(llm);
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V3.to_string());

    agent.execute(&mut state).await;

    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V3));
    assert_eq!(state.optimization_analysis.as_deref(), Some("Already optimal."));
}

#[tokio::test]
async fn test_optimizer_marks_done_even_on_empty_response() {
    let llm = ScriptedLlm::new([""]);
    let agent = OptimizationAgent::new(llm);
    let mut state = loaded_state(5);
    state.current_code = Some(SOLUTION_V2.to_string());

    agent.execute(&mut state).await;

    assert!(state.optimization_done);
    assert!(state.optimization_analysis.is_none());
    assert!(state.error_message.is_some());
}

#[test]
fn test_agent_names() {
    let llm: Arc<ScriptedLlm> = ScriptedLlm::new(Vec::<String>::new());
    assert_eq!(AnalyzerAgent::new(llm.clone()).name(), "Problem Analyzer & Planner");
    assert_eq!(CodingAgent::new(llm.clone()).name(), "Coding Agent");
    assert_eq!(DebuggingAgent::new(llm.clone()).name(), "Debugging Agent");
    assert_eq!(OptimizationAgent::new(llm).name(), "Optimization Agent");
}
