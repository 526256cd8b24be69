//! Tests for solver types

use leetweaver::solver::types::*;
use serde_json::json;

use super::common::*;

#[test]
fn test_verdict_serializes_as_judge_text() {
    assert_eq!(serde_json::to_value(Verdict::WrongAnswer).unwrap(), json!("Wrong Answer"));
    assert_eq!(serde_json::to_value(Verdict::Accepted).unwrap(), json!("Accepted"));

    let verdict: Verdict = serde_json::from_value(json!("Time Limit Exceeded")).unwrap();
    assert_eq!(verdict, Verdict::TimeLimitExceeded);
}

#[test]
fn test_submission_result_extra_fields_are_flat() {
    let value = serde_json::to_value(wrong_answer()).unwrap();
    assert_eq!(value["status"], "Wrong Answer");
    assert_eq!(value["last_testcase"], "[3,3]\n6");
    assert_eq!(value["expected_output"], "[0,1]");
    // Unset fixed fields are omitted entirely
    assert!(value.get("runtime").is_none());
    assert!(value.get("extra").is_none());
}

#[test]
fn test_submission_result_parses_unknown_keys_into_extra() {
    let result: SubmissionResult = serde_json::from_value(json!({
        "status": "Runtime Error",
        "runtime_error": "IndexError: list index out of range",
        "last_testcase": "[]"
    }))
    .unwrap();

    assert_eq!(result.status, Verdict::RuntimeError);
    assert_eq!(result.extra.len(), 2);
    assert_eq!(result.extra["last_testcase"], "[]");
    assert!(result.runtime.is_none());
}

#[test]
fn test_to_fields_includes_fixed_and_extra() {
    let fields = accepted().to_fields();
    assert_eq!(fields["status"], "Accepted");
    assert_eq!(fields["runtime"], "52 ms");
    assert_eq!(fields["memory"], "17.1 MB");

    let fields = wrong_answer().to_fields();
    assert_eq!(fields["actual_output"], "[0,0]");
}

#[test]
fn test_new_state_defaults() {
    let state = WorkflowState::new(TWO_SUM_URL, 5, Language::Cpp);

    assert_eq!(state.status, WorkflowStatus::Initialized);
    assert_eq!(state.iteration, 0);
    assert_eq!(state.max_iterations, 5);
    assert_eq!(state.language, Language::Cpp);
    assert_eq!(state.problem_title, "two-sum");
    assert!(!state.run_id.is_empty());
    assert!(state.current_code.is_none());
    assert!(state.error_message.is_none());
    assert!(!state.optimization_done);
}

#[test]
fn test_run_ids_are_unique() {
    let a = WorkflowState::new(TWO_SUM_URL, 5, Language::Python3);
    let b = WorkflowState::new(TWO_SUM_URL, 5, Language::Python3);
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn test_fail_sets_status_and_message() {
    let mut state = loaded_state(5);
    state.fail("Judge login failed");
    assert_eq!(state.status, WorkflowStatus::Failed);
    assert_eq!(state.error_message.as_deref(), Some("Judge login failed"));
}

#[test]
fn test_blank_code_never_replaces_previous_attempt() {
    let mut state = loaded_state(5);
    assert!(state.set_code(SOLUTION_V1));
    assert!(!state.set_code(""));
    assert!(!state.set_code("\n\t "));
    assert_eq!(state.current_code.as_deref(), Some(SOLUTION_V1));
}

#[test]
fn test_failed_tests_filters_passing_results() {
    let mut state = loaded_state(5);
    assert!(state.failed_tests().is_empty());

    state.test_results = Some(vec![passed("a"), failed("b"), passed("c"), failed("d")]);
    let ids: Vec<&str> = state.failed_tests().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "d"]);
}

#[test]
fn test_has_description_ignores_whitespace() {
    let mut state = loaded_state(5);
    assert!(state.has_description());
    state.problem_description = Some("   \n".to_string());
    assert!(!state.has_description());
    state.problem_description = None;
    assert!(!state.has_description());
}

#[test]
fn test_terminal_states() {
    assert!(WorkflowStatus::Success.is_terminal());
    assert!(WorkflowStatus::Failed.is_terminal());
    for status in [
        WorkflowStatus::Initialized,
        WorkflowStatus::Planning,
        WorkflowStatus::Coding,
        WorkflowStatus::Testing,
        WorkflowStatus::Optimizing,
        WorkflowStatus::Submitting,
        WorkflowStatus::Debugging,
    ] {
        assert!(!status.is_terminal(), "{} should not be terminal", status);
    }
}

#[test]
fn test_language_names_and_fences() {
    assert_eq!(Language::Python3.display_name(), "Python3");
    assert_eq!(Language::Python3.fence_tag(), "python");
    assert_eq!(Language::Cpp.display_name(), "C++");
    assert_eq!(Language::Cpp.fence_tag(), "cpp");
    assert!(Language::Cpp.fence_tags().contains(&"c++"));
    assert_eq!(Language::default(), Language::Python3);
    assert_eq!(Language::Java.to_string(), "Java");
}

#[test]
fn test_state_round_trips_through_json() {
    let mut state = loaded_state(3);
    state.status = WorkflowStatus::Debugging;
    state.iteration = 2;
    state.submission_results = Some(wrong_answer());

    let json = serde_json::to_string(&state).unwrap();
    let restored: WorkflowState = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.status, WorkflowStatus::Debugging);
    assert_eq!(restored.iteration, 2);
    assert_eq!(restored.submission_results, Some(wrong_answer()));
    assert_eq!(restored.run_id, state.run_id);
}
