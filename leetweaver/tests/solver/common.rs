//! Scripted collaborators and fixtures for solver tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use leetweaver::judge::{JudgeConnector, JudgeError, JudgeSession, ProblemDetails};
use leetweaver::llm::Generate;
use leetweaver::runner::{RunnerError, TestRunner};
use leetweaver::solver::types::{Language, SubmissionResult, TestCase, TestResult, Verdict, WorkflowState};
use leetweaver::solver::WorkflowConfig;
use leetweaver_sdk::async_trait;
use serde_json::json;

pub const TWO_SUM_URL: &str = "https://leetcode.com/problems/two-sum/";

pub const STARTING_CODE: &str = "class Solution:\n    def twoSum(self, nums: List[int], target: int) -> List[int]:\n        ";

pub const SOLUTION_V1: &str = "class Solution:\n    def twoSum(self, nums, target):\n        for i in range(len(nums)):\n            for j in range(i, len(nums)):\n                if nums[i] + nums[j] == target:\n                    return [i, j]";

pub const SOLUTION_V2: &str = "class Solution:\n    def twoSum(self, nums, target):\n        for i in range(len(nums)):\n            for j in range(i + 1, len(nums)):\n                if nums[i] + nums[j] == target:\n                    return [i, j]";

pub const SOLUTION_V3: &str = "class Solution:\n    def twoSum(self, nums, target):\n        seen = {}\n        for i, n in enumerate(nums):\n            if target - n in seen:\n                return [seen[target - n], i]\n            seen[n] = i";

pub const SOLUTION_V4: &str = "class Solution:\n    def twoSum(self, nums, target):\n        index = {n: i for i, n in enumerate(nums)}\n        for i, n in enumerate(nums):\n            j = index.get(target - n)\n            if j is not None and j != i:\n                return [i, j]";

pub const SOLUTION_V5: &str = "class Solution:\n    def twoSum(self, nums, target):\n        order = sorted(range(len(nums)), key=nums.__getitem__)\n        lo, hi = 0, len(nums) - 1\n        while lo < hi:\n            s = nums[order[lo]] + nums[order[hi]]\n            if s == target:\n                return sorted([order[lo], order[hi]])\n            lo, hi = (lo + 1, hi) if s < target else (lo, hi - 1)";

pub const TWO_SUM_DESCRIPTION: &str = "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.

Example 1:

Input: nums = [2,7,11,15], target = 9
Output: [0,1]
Explanation: Because nums[0] + nums[1] == 9, we return [0, 1].

Constraints:

2 <= nums.length <= 10^4";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Generation
// ============================================================================

/// Replays canned responses in order; "" once the script runs out
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait]
impl Generate for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> String {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.responses).pop_front().unwrap_or_default()
    }
}

// ============================================================================
// Judge
// ============================================================================

/// What the mock judge does, plus everything it saw
#[derive(Debug, Default)]
pub struct JudgeScript {
    pub details: Option<ProblemDetails>,
    pub verdicts: VecDeque<SubmissionResult>,
    pub refuse_connect: bool,
    pub fail_login: bool,
    pub fail_language: bool,
    pub fail_input: bool,
    pub fail_submit: bool,
    pub panic_on_submit: bool,

    pub calls: Vec<&'static str>,
    pub languages: Vec<Language>,
    pub submitted: Vec<String>,
    pub sessions_opened: usize,
    pub sessions_closed: usize,
}

impl JudgeScript {
    pub fn two_sum() -> Self {
        Self {
            details: Some(two_sum_details()),
            ..Default::default()
        }
    }

    pub fn with_verdicts(mut self, verdicts: impl IntoIterator<Item = SubmissionResult>) -> Self {
        self.verdicts.extend(verdicts);
        self
    }
}

pub struct MockConnector {
    script: Arc<Mutex<JudgeScript>>,
}

impl MockConnector {
    pub fn new(script: JudgeScript) -> (Arc<Self>, Arc<Mutex<JudgeScript>>) {
        let script = Arc::new(Mutex::new(script));
        (
            Arc::new(Self {
                script: script.clone(),
            }),
            script,
        )
    }
}

#[async_trait]
impl JudgeConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn JudgeSession>, JudgeError> {
        let mut script = lock(&self.script);
        if script.refuse_connect {
            return Err(JudgeError::Browser("chromium not found".to_string()));
        }
        script.sessions_opened += 1;
        Ok(Box::new(MockSession {
            script: self.script.clone(),
        }))
    }
}

pub struct MockSession {
    script: Arc<Mutex<JudgeScript>>,
}

#[async_trait]
impl JudgeSession for MockSession {
    async fn login(&mut self) -> Result<(), JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("login");
        if script.fail_login {
            return Err(JudgeError::Login("profile avatar not found".to_string()));
        }
        Ok(())
    }

    async fn get_problem_details(&mut self, url: &str) -> Result<ProblemDetails, JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("get_problem_details");
        script
            .details
            .clone()
            .ok_or_else(|| JudgeError::ProblemUnavailable(url.to_string()))
    }

    async fn ensure_language_is(&mut self, language: Language) -> Result<(), JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("ensure_language_is");
        script.languages.push(language);
        if script.fail_language {
            return Err(JudgeError::Language(language.to_string()));
        }
        Ok(())
    }

    async fn input_code(&mut self, code: &str) -> Result<(), JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("input_code");
        if script.fail_input {
            return Err(JudgeError::CodeInput("editor not found".to_string()));
        }
        script.submitted.push(code.to_string());
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), JudgeError> {
        let should_panic = {
            let mut script = lock(&self.script);
            script.calls.push("submit");
            if script.fail_submit {
                return Err(JudgeError::Submit("button not clickable".to_string()));
            }
            script.panic_on_submit
        };
        if should_panic {
            panic!("submit button exploded");
        }
        Ok(())
    }

    async fn get_submission_verdict(&mut self) -> Result<SubmissionResult, JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("get_submission_verdict");
        script.verdicts.pop_front().ok_or(JudgeError::Timeout {
            what: "submission verdict".to_string(),
            after: Duration::from_secs(200),
        })
    }

    async fn close(&mut self) -> Result<(), JudgeError> {
        let mut script = lock(&self.script);
        script.calls.push("close");
        script.sessions_closed += 1;
        Ok(())
    }
}

pub fn script_view(script: &Arc<Mutex<JudgeScript>>) -> MutexGuard<'_, JudgeScript> {
    lock(script)
}

// ============================================================================
// Test runner
// ============================================================================

/// Returns queued result batches; records the cases it was given
#[derive(Default)]
pub struct MockRunner {
    batches: Mutex<VecDeque<Result<Vec<TestResult>, String>>>,
    seen: Mutex<Vec<Vec<TestCase>>>,
}

impl MockRunner {
    pub fn new(batches: impl IntoIterator<Item = Result<Vec<TestResult>, String>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn runs(&self) -> Vec<Vec<TestCase>> {
        lock(&self.seen).clone()
    }
}

#[async_trait]
impl TestRunner for MockRunner {
    async fn run(
        &self,
        _language: Language,
        _code: &str,
        cases: &[TestCase],
    ) -> Result<Vec<TestResult>, RunnerError> {
        lock(&self.seen).push(cases.to_vec());
        match lock(&self.batches).pop_front() {
            Some(Ok(results)) => Ok(results),
            Some(Err(stderr)) => Err(RunnerError::Exit { code: Some(1), stderr }),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn two_sum_details() -> ProblemDetails {
    ProblemDetails {
        title: Some("Two Sum".to_string()),
        description: TWO_SUM_DESCRIPTION.to_string(),
        starting_code: STARTING_CODE.to_string(),
    }
}

pub fn analysis_response() -> String {
    "## Constraints\n- 2 <= nums.length <= 10^4\n- Exactly one valid answer exists\n\n## Suggested Approach\n- **Algorithm/Data Structure:** Hash map\n  - **Reasoning:** O(1) complement lookup\n\n## Plan/Pseudocode\n1. Walk the array\n2. Look up target - n in the map\n3. Return both indices".to_string()
}

pub fn code_response(code: &str) -> String {
    format!("```python\n{}\n```", code)
}

pub fn fix_response(analysis: &str, code: &str) -> String {
    format!("{}\n\n```python\n{}\n```", analysis, code)
}

pub fn accepted() -> SubmissionResult {
    let mut result = SubmissionResult::new(Verdict::Accepted);
    result.runtime = Some("52 ms".to_string());
    result.memory = Some("17.1 MB".to_string());
    result
}

pub fn wrong_answer() -> SubmissionResult {
    SubmissionResult::new(Verdict::WrongAnswer)
        .with_field("last_testcase", "[3,3]\n6")
        .with_field("expected_output", "[0,1]")
        .with_field("actual_output", "[0,0]")
}

pub fn passed(id: &str) -> TestResult {
    TestResult {
        id: id.to_string(),
        input: json!([[2, 7, 11, 15], 9]),
        expected_output: json!([0, 1]),
        actual_output: json!([0, 1]),
        passed: true,
        error: None,
    }
}

pub fn failed(id: &str) -> TestResult {
    TestResult {
        id: id.to_string(),
        input: json!([[3, 3], 6]),
        expected_output: json!([0, 1]),
        actual_output: json!([0, 0]),
        passed: false,
        error: None,
    }
}

pub fn workflow_config(max_iterations: usize) -> WorkflowConfig {
    WorkflowConfig {
        max_iterations,
        language: Language::Python3,
        enable_optimization: false,
    }
}

/// A state as it looks right after the problem page was read
pub fn loaded_state(max_iterations: usize) -> WorkflowState {
    let mut state = WorkflowState::new(TWO_SUM_URL, max_iterations, Language::Python3);
    state.problem_title = "Two Sum".to_string();
    state.problem_description = Some(TWO_SUM_DESCRIPTION.to_string());
    state.starting_code = Some(STARTING_CODE.to_string());
    state.current_code = Some(STARTING_CODE.to_string());
    state
}
