//! Tests for CLI parsing and flag overrides

use std::path::PathBuf;

use clap::Parser;
use leetweaver::config::Config;
use leetweaver::solver::cli::*;
use leetweaver::solver::types::Language;

use super::common::*;

fn base_config() -> Config {
    Config::from_lookup(|key| match key {
        "LEETCODE_USERNAME" => Some("octocat".to_string()),
        "LEETCODE_PASSWORD" => Some("hunter2".to_string()),
        "GEMINI_API_KEY" => Some("key".to_string()),
        _ => None,
    })
    .unwrap()
}

#[test]
fn test_parse_minimal_args() {
    let args = Args::try_parse_from(["leetweaver", TWO_SUM_URL]).unwrap();
    assert_eq!(args.url, TWO_SUM_URL);
    assert!(args.flags.max_iterations.is_none());
    assert!(!args.flags.headless);
    assert!(args.validate().is_ok());
}

#[test]
fn test_parse_all_flags() {
    let args = Args::try_parse_from([
        "leetweaver",
        TWO_SUM_URL,
        "--max-iterations",
        "3",
        "--headless",
        "--language",
        "cpp",
        "--results-file",
        "/tmp/results.json",
        "--sandbox-command",
        "python3 sandbox/run.py",
        "--optimize",
        "--debug",
    ])
    .unwrap();

    assert_eq!(args.flags.max_iterations, Some(3));
    assert_eq!(args.flags.language, Some(Language::Cpp));
    assert_eq!(args.flags.results_file, Some(PathBuf::from("/tmp/results.json")));
    assert!(args.flags.optimize);
    assert!(args.flags.debug);
}

#[test]
fn test_unknown_language_is_rejected() {
    assert!(Args::try_parse_from(["leetweaver", TWO_SUM_URL, "--language", "cobol"]).is_err());
}

#[test]
fn test_zero_iterations_is_rejected() {
    let args = Args::try_parse_from(["leetweaver", TWO_SUM_URL, "--max-iterations", "0"]).unwrap();
    assert!(args.validate().is_err());
}

#[test]
fn test_flags_override_environment() {
    let mut config = base_config();
    assert_eq!(config.max_iterations, 5);
    assert!(!config.headless);

    let flags = SolverFlags {
        max_iterations: Some(2),
        headless: true,
        language: Some(Language::Java),
        results_file: Some(PathBuf::from("out.json")),
        sandbox_command: Some("  ".to_string()),
        optimize: true,
        debug: false,
    };
    flags.apply(&mut config);

    assert_eq!(config.max_iterations, 2);
    assert!(config.headless);
    assert_eq!(config.language, Language::Java);
    assert_eq!(config.results_file, Some(PathBuf::from("out.json")));
    assert!(config.enable_optimization);
    // Blank commands never enable local testing
    assert!(config.sandbox_command.is_none());
}

#[test]
fn test_default_flags_change_nothing() {
    let mut config = base_config();
    SolverFlags::default().apply(&mut config);
    assert_eq!(config.max_iterations, 5);
    assert_eq!(config.language, Language::Python3);
    assert!(!config.enable_optimization);
}

#[test]
fn test_problem_url_validation() {
    assert!(validate_problem_url(TWO_SUM_URL).is_ok());
    assert!(validate_problem_url("https://leetcode.com/problems/two-sum").is_ok());
    assert!(validate_problem_url("https://leetcode.com/problems/").is_err());
    assert!(validate_problem_url("https://example.com/problems/two-sum/").is_err());
    assert!(validate_problem_url("two-sum").is_err());
}

#[test]
fn test_invalid_url_fails_validation() {
    let args = Args::try_parse_from(["leetweaver", "https://leetcode.com/contest/"]).unwrap();
    assert!(args.validate().is_err());
}

#[test]
fn test_batch_args() {
    let args = BatchArgs::try_parse_from([
        "batch-solver",
        "--urls",
        "problems.txt",
        "--max-problems",
        "4",
        "--headless",
    ])
    .unwrap();
    assert_eq!(args.urls, PathBuf::from("problems.txt"));
    assert_eq!(args.max_problems, Some(4));
    assert!(args.flags.headless);
    assert!(args.validate().is_ok());
}

#[test]
fn test_url_list_parsing() {
    let content = "\
# warm-up
https://leetcode.com/problems/two-sum/

https://leetcode.com/problems/add-two-numbers/
not a url
https://leetcode.com/problems/two-sum/
   https://leetcode.com/problems/valid-parentheses/
";
    let (urls, rejected) = parse_url_list(content);
    assert_eq!(
        urls,
        vec![
            "https://leetcode.com/problems/two-sum/".to_string(),
            "https://leetcode.com/problems/add-two-numbers/".to_string(),
            "https://leetcode.com/problems/valid-parentheses/".to_string(),
        ]
    );
    assert_eq!(rejected, vec!["not a url".to_string()]);
}
