//! Core data structures for the solver workflow.
//!
//! This module contains the state record threaded through every phase,
//! the judge verdict types, local test artifacts, and the target language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Workflow Status
// ============================================================================

/// Phase the solver state machine is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowStatus {
    Initialized,
    Planning,
    Coding,
    Testing,
    Optimizing,
    Submitting,
    Debugging,
    Success,
    Failed,
}

impl WorkflowStatus {
    /// Terminal states end the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Success | WorkflowStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Initialized => "Initialized",
            WorkflowStatus::Planning => "Planning",
            WorkflowStatus::Coding => "Coding",
            WorkflowStatus::Testing => "Testing",
            WorkflowStatus::Optimizing => "Optimizing",
            WorkflowStatus::Submitting => "Submitting",
            WorkflowStatus::Debugging => "Debugging",
            WorkflowStatus::Success => "Success",
            WorkflowStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Judge Verdicts
// ============================================================================

/// Final verdict reported by the judge for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Compile Error")]
    CompileError,
    #[serde(rename = "Memory Limit Exceeded")]
    MemoryLimitExceeded,
    Unknown,
}

impl Verdict {
    const KNOWN: [Verdict; 6] = [
        Verdict::Accepted,
        Verdict::WrongAnswer,
        Verdict::TimeLimitExceeded,
        Verdict::RuntimeError,
        Verdict::CompileError,
        Verdict::MemoryLimitExceeded,
    ];

    /// Map the verdict banner text shown by the judge to a verdict.
    ///
    /// The banner often carries extra lines ("Accepted\nRuntime: 10 ms"),
    /// so matching is by containment, in declaration order.
    pub fn from_status_text(text: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|verdict| text.contains(verdict.as_str()))
            .unwrap_or(Verdict::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
            Verdict::TimeLimitExceeded => "Time Limit Exceeded",
            Verdict::RuntimeError => "Runtime Error",
            Verdict::CompileError => "Compile Error",
            Verdict::MemoryLimitExceeded => "Memory Limit Exceeded",
            Verdict::Unknown => "Unknown",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of one submission.
///
/// Besides the fixed fields, the judge may attach arbitrary extra fields
/// (`last_testcase`, `expected_output`, `runtime_error`, ...). They are kept
/// flattened so the serialized form stays a single flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: Verdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SubmissionResult {
    pub fn new(status: Verdict) -> Self {
        Self {
            status,
            runtime: None,
            memory: None,
            details: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attach an extra field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flatten the result into a JSON object map, fixed fields included
    pub fn to_fields(&self) -> serde_json::Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

// ============================================================================
// Local Testing
// ============================================================================

/// One local test case: positional arguments plus the expected result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub input: Vec<Value>,
    pub expected_output: Value,
}

/// Outcome of running one test case in the sandbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,

    #[serde(default)]
    pub input: Value,

    #[serde(default)]
    pub expected_output: Value,

    #[serde(default)]
    pub actual_output: Value,

    pub passed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Target Language
// ============================================================================

/// Language solutions are written and submitted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Language {
    #[default]
    Python3,
    Cpp,
    Java,
    #[value(name = "javascript")]
    JavaScript,
    Rust,
}

impl Language {
    /// Name shown in the judge's language dropdown
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python3 => "Python3",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::Rust => "Rust",
        }
    }

    /// Markdown fence tag used when asking for code
    pub fn fence_tag(&self) -> &'static str {
        self.fence_tags()[0]
    }

    /// Fence tags accepted when extracting code (compared case-insensitively)
    pub fn fence_tags(&self) -> &'static [&'static str] {
        match self {
            Language::Python3 => &["python", "python3", "py"],
            Language::Cpp => &["cpp", "c++", "cc"],
            Language::Java => &["java"],
            Language::JavaScript => &["javascript", "js"],
            Language::Rust => &["rust", "rs"],
        }
    }

    /// Line prefixes that mark a comment-only line
    pub fn comment_prefixes(&self) -> &'static [&'static str] {
        match self {
            Language::Python3 => &["#"],
            _ => &["//", "/*", "*"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python3),
            "cpp" | "c++" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "javascript" | "js" => Ok(Language::JavaScript),
            "rust" | "rs" => Ok(Language::Rust),
            other => Err(format!(
                "Unsupported language '{}'. Expected one of: python3, cpp, java, javascript, rust",
                other
            )),
        }
    }
}

// ============================================================================
// Workflow State
// ============================================================================

/// Mutable record passed through every phase of one solver run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub run_id: String,
    pub problem_url: String,
    pub problem_title: String,
    pub language: Language,

    pub problem_description: Option<String>,
    pub starting_code: Option<String>,

    pub plan: Option<String>,
    pub constraints: Option<Vec<String>>,

    pub current_code: Option<String>,

    pub test_cases: Option<Vec<TestCase>>,
    pub test_results: Option<Vec<TestResult>>,

    pub submission_results: Option<SubmissionResult>,

    pub debug_analysis: Option<String>,
    pub optimization_analysis: Option<String>,
    /// Optimization runs at most once per problem
    pub optimization_done: bool,

    pub iteration: usize,
    pub max_iterations: usize,
    pub status: WorkflowStatus,
    pub error_message: Option<String>,

    pub started_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(problem_url: impl Into<String>, max_iterations: usize, language: Language) -> Self {
        let problem_url = problem_url.into();
        Self {
            run_id: leetweaver_sdk::new_run_id(),
            problem_title: title_from_url(&problem_url),
            problem_url,
            language,
            problem_description: None,
            starting_code: None,
            plan: None,
            constraints: None,
            current_code: None,
            test_cases: None,
            test_results: None,
            submission_results: None,
            debug_analysis: None,
            optimization_analysis: None,
            optimization_done: false,
            iteration: 0,
            max_iterations,
            status: WorkflowStatus::Initialized,
            error_message: None,
            started_at: Utc::now(),
        }
    }

    /// Replace the candidate solution. Blank code is refused so a failed
    /// generation can never wipe out the previous attempt.
    pub fn set_code(&mut self, code: impl Into<String>) -> bool {
        let code = code.into();
        if code.trim().is_empty() {
            return false;
        }
        self.current_code = Some(code);
        true
    }

    /// Move to the terminal failure state with a reason
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = WorkflowStatus::Failed;
        self.error_message = Some(message.into());
    }

    /// Test results that did not pass
    pub fn failed_tests(&self) -> Vec<&TestResult> {
        self.test_results
            .iter()
            .flatten()
            .filter(|result| !result.passed)
            .collect()
    }

    pub fn has_description(&self) -> bool {
        self.problem_description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// Derive a readable fallback title from the problem URL slug
pub fn title_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|slug| !slug.is_empty())
        .unwrap_or(url)
        .to_string()
}
