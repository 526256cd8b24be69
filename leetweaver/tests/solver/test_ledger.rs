//! Tests for results ledger persistence

use leetweaver::ledger::ResultsLedger;
use leetweaver::solver::types::*;
use serde_json::{json, Value};

use super::common::*;

fn finished(url: &str, status: WorkflowStatus, iteration: usize) -> WorkflowState {
    let mut state = WorkflowState::new(url, 5, Language::Python3);
    state.status = status;
    state.iteration = iteration;
    state
}

#[tokio::test]
async fn test_missing_file_loads_empty_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = ResultsLedger::load(&dir.path().join("absent.json")).await.unwrap();
    assert!(ledger.problems.is_empty());
    assert_eq!(ledger.statistics.total_attempted, 0);
}

#[tokio::test]
async fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("results.json");

    let mut solved = finished(TWO_SUM_URL, WorkflowStatus::Success, 2);
    solved.problem_title = "Two Sum".to_string();
    solved.submission_results = Some(accepted());

    let mut ledger = ResultsLedger::default();
    ledger.record(&solved);
    ledger.record(&finished(
        "https://leetcode.com/problems/median-of-two-sorted-arrays/",
        WorkflowStatus::Failed,
        5,
    ));
    ledger.save(&path).await.unwrap();

    let reloaded = ResultsLedger::load(&path).await.unwrap();
    assert_eq!(reloaded.problems.len(), 2);
    assert_eq!(reloaded.problems[0].problem_title, "Two Sum");
    assert_eq!(reloaded.problems[0].attempts, 2);
    assert_eq!(reloaded.problems[0].details["status"], "Accepted");
    assert_eq!(reloaded.problems[1].details, Value::Null);
    assert_eq!(reloaded.statistics.total_attempted, 2);
    assert_eq!(reloaded.statistics.total_solved, 1);
    assert_eq!(reloaded.statistics.accuracy, 50.0);
    assert!(reloaded.is_solved(TWO_SUM_URL));
}

#[tokio::test]
async fn test_hand_edited_statistics_are_recomputed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let document = json!({
        "problems": [{
            "problem_title": "Two Sum",
            "problem_url": TWO_SUM_URL,
            "status": "Success",
            "attempts": 1,
            "timestamp": "2024-05-01T12:00:00Z",
            "duration_secs": 42.5
        }],
        "statistics": {"total_attempted": 99, "total_solved": 0, "accuracy": 0.0}
    });
    tokio::fs::write(&path, document.to_string()).await.unwrap();

    let ledger = ResultsLedger::load(&path).await.unwrap();
    assert_eq!(ledger.statistics.total_attempted, 1);
    assert_eq!(ledger.statistics.total_solved, 1);
    assert_eq!(ledger.statistics.accuracy, 100.0);
    assert_eq!(ledger.problems[0].details, Value::Null);
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let error = ResultsLedger::load(&path).await.unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse results ledger"));
}

#[test]
fn test_failed_runs_do_not_count_as_solved() {
    let mut ledger = ResultsLedger::default();
    ledger.record(&finished(TWO_SUM_URL, WorkflowStatus::Failed, 5));
    assert!(!ledger.is_solved(TWO_SUM_URL));

    ledger.record(&finished(TWO_SUM_URL, WorkflowStatus::Success, 1));
    assert!(ledger.is_solved(TWO_SUM_URL));
    assert_eq!(ledger.statistics.total_attempted, 2);
}

#[test]
fn test_default_path_points_at_results_file() {
    let path = ResultsLedger::default_path();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name == "results.json" || name == ".leetweaver-results.json");
}
