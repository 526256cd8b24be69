//! Parsers that turn free-form LLM text into structured workflow data.
//!
//! Every agent goes through these helpers, so code-block extraction behaves
//! the same whether the block came from the coder, the debugger or the
//! optimizer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::solver::types::{Language, SubmissionResult, TestCase, TestResult, WorkflowState};

/// Fenced block: optional tag on the opening line, body matched non-greedily
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```([A-Za-z0-9_+#.\-]*)[ \t]*\r?\n?([\s\S]*?)```").expect("invalid fence regex")
});

static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```json\s*([\s\S]+?)\s*```").expect("invalid json fence regex"));

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("invalid blank-run regex"));

static INPUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)input:").expect("invalid input regex"));

static OUTPUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)output:").expect("invalid output regex"));

static EXAMPLE_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(explanation:|example\s*\d+\s*:|constraints:|follow[- ]up:|input:)")
        .expect("invalid example terminator regex")
});

static ASSIGNMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([\s\S]*)$").expect("invalid assignment regex"));

/// Longest rendering of one failure field handed to the debugger
pub const FAILURE_FIELD_LIMIT: usize = 300;

/// Local failures rendered in full before summarizing the rest
pub const MAX_FAILED_TESTS_IN_CONTEXT: usize = 3;

const SUBMISSION_PRIORITY_KEYS: [&str; 6] = [
    "status",
    "error_message",
    "last_testcase",
    "expected_output",
    "runtime_error",
    "compile_error",
];

pub const NO_CONSTRAINTS: &str = "No specific constraints identified.";
pub const PARSING_FAILED: &str = "Parsing failed.";
pub const ANALYSIS_UNCLEAR: &str =
    "LLM provided a response, but analysis could not be cleanly extracted.";

// ============================================================================
// Code Blocks
// ============================================================================

/// A fenced block located in a response
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Byte offset of the opening fence
    pub start: usize,
    /// Trimmed block body
    pub content: String,
}

/// Find the first fenced block tagged with one of `language`'s fence tags
pub fn find_code_block(text: &str, language: Language) -> Option<CodeBlock> {
    FENCE_RE.captures_iter(text).find_map(|caps| {
        let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let tagged = language
            .fence_tags()
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(tag));
        if !tagged {
            return None;
        }
        let whole = caps.get(0)?;
        Some(CodeBlock {
            start: whole.start(),
            content: caps.get(2).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
        })
    })
}

/// True when at least one line is neither blank nor a comment
pub fn is_substantive_code(code: &str, language: Language) -> bool {
    code.lines().any(|line| {
        let line = line.trim();
        !line.is_empty()
            && !language
                .comment_prefixes()
                .iter()
                .any(|prefix| line.starts_with(prefix))
    })
}

/// Extract solution code from an LLM response.
///
/// # Returns
/// The trimmed body of the first block tagged with the target language, or
/// `None` when there is no such block or the block holds only comments.
pub fn extract_code_block(text: &str, language: Language) -> Option<String> {
    find_code_block(text, language)
        .map(|block| block.content)
        .filter(|code| is_substantive_code(code, language))
}

// ============================================================================
// Problem Analysis
// ============================================================================

/// Plan and constraints recovered from an analysis response
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSections {
    pub plan: String,
    pub constraints: Vec<String>,
}

/// Split an analysis response on its `## Constraints`, `## Suggested Approach`
/// and `## Plan/Pseudocode` headings.
///
/// When the headings are missing the raw text becomes the plan and the
/// constraints collapse to a single "Parsing failed." entry.
pub fn parse_analysis(text: &str) -> AnalysisSections {
    let constraints_section = text
        .split("## Constraints")
        .nth(1)
        .map(|rest| rest.split("## Suggested Approach").next().unwrap_or(rest).trim());
    let plan_section = text.split("## Plan/Pseudocode").nth(1).map(str::trim);

    match (constraints_section, plan_section) {
        (Some(constraints), Some(plan)) => {
            let mut items: Vec<String> = constraints
                .lines()
                .map(str::trim)
                .filter(|line| line.starts_with('-'))
                .map(|line| line.trim_start_matches(['-', ' ']).trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
            if items.is_empty() {
                items.push(NO_CONSTRAINTS.to_string());
            }
            AnalysisSections {
                plan: plan.to_string(),
                constraints: items,
            }
        }
        _ => AnalysisSections {
            plan: text.trim().to_string(),
            constraints: vec![PARSING_FAILED.to_string()],
        },
    }
}

// ============================================================================
// Debug / Optimization Responses
// ============================================================================

/// Analysis text and optional replacement code from a fix-style response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixResponse {
    pub analysis: Option<String>,
    pub code: Option<String>,
}

/// Split a debugging or optimization response into analysis and code.
///
/// Text before the first tagged block is the analysis; the block body is the
/// replacement code when it holds real code. Without a block the whole
/// response is analysis.
pub fn parse_fix_response(text: &str, language: Language) -> FixResponse {
    let (analysis, code) = match find_code_block(text, language) {
        Some(block) => {
            let before = text[..block.start].trim().to_string();
            if is_substantive_code(&block.content, language) {
                (before, Some(block.content))
            } else if before.is_empty() {
                (text.trim().to_string(), None)
            } else {
                (before, None)
            }
        }
        None => (text.trim().to_string(), None),
    };

    let analysis = if analysis.is_empty() {
        None
    } else {
        let cleaned = clean_analysis(&analysis);
        Some(if cleaned.is_empty() {
            ANALYSIS_UNCLEAR.to_string()
        } else {
            cleaned
        })
    };

    FixResponse { analysis, code }
}

/// Drop a greeting first line and a "let me know" closing line
pub fn clean_analysis(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if let Some(first) = lines.first() {
        let lower = first.to_lowercase();
        if lower.contains("here's the analysis") || lower.contains("sure, i can help") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.to_lowercase().contains("let me know if") {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}

// ============================================================================
// Failure Context
// ============================================================================

/// Describe the most recent failure for the debugger.
///
/// A rejected submission takes priority over failing local tests. Returns
/// `None` when neither is present.
pub fn failure_context(state: &WorkflowState) -> Option<String> {
    if let Some(result) = &state.submission_results {
        if !result.status.is_accepted() {
            return Some(submission_failure_context(result));
        }
    }
    test_failure_context(state.test_results.as_deref().unwrap_or(&[]))
}

/// Render a rejected submission, priority fields first
pub fn submission_failure_context(result: &SubmissionResult) -> String {
    let fields = result.to_fields();
    let mut lines = vec!["The code failed submission with the following result:".to_string()];

    let priority = SUBMISSION_PRIORITY_KEYS
        .iter()
        .filter_map(|key| fields.get(*key).map(|value| (*key, value)));
    let others = fields
        .iter()
        .map(|(key, value)| (key.as_str(), value))
        .filter(|(key, _)| !SUBMISSION_PRIORITY_KEYS.contains(key));

    for (key, value) in priority.chain(others) {
        if !is_truthy(value) {
            continue;
        }
        lines.push(format!(
            "- {}: {}",
            title_case(key),
            truncate_chars(&render_value(value), FAILURE_FIELD_LIMIT)
        ));
    }
    lines.join("\n")
}

/// Render failing local tests, at most three in full
pub fn test_failure_context(results: &[TestResult]) -> Option<String> {
    let failed: Vec<&TestResult> = results.iter().filter(|r| !r.passed).collect();
    if failed.is_empty() {
        return None;
    }

    let mut lines = vec!["The code failed the following local test cases:".to_string()];
    for test in failed.iter().take(MAX_FAILED_TESTS_IN_CONTEXT) {
        lines.push(format!("- ID: {}", test.id));
        lines.push(format!("  Input: {}", test.input));
        lines.push(format!("  Expected Output: {}", test.expected_output));
        lines.push(format!("  Actual Output: {}", test.actual_output));
        if let Some(error) = test.error.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("  Error: {}", error));
        }
    }
    if failed.len() > MAX_FAILED_TESTS_IN_CONTEXT {
        lines.push(format!(
            "... and {} more failed tests.",
            failed.len() - MAX_FAILED_TESTS_IN_CONTEXT
        ));
    }
    Some(lines.join("\n"))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `last_testcase` -> `Last Testcase`
pub fn title_case(key: &str) -> String {
    key.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Collapse runs of blank lines in scraped page text
pub fn normalize_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").trim().to_string()
}

// ============================================================================
// Test Cases
// ============================================================================

/// Pull `Input:` / `Output:` example pairs out of a problem description.
///
/// Each example's output runs until the explanation, the next example, the
/// constraints section or the next `Input:`.
pub fn extract_example_test_cases(description: &str) -> Vec<TestCase> {
    let mut cases = Vec::new();
    let mut cursor = 0;

    while let Some(input_match) = INPUT_RE.find_at(description, cursor) {
        let Some(output_match) = OUTPUT_RE.find_at(description, input_match.end()) else {
            break;
        };
        let output_end = EXAMPLE_END_RE
            .find_at(description, output_match.end())
            .map(|m| m.start())
            .unwrap_or(description.len());

        let input_text = description[input_match.end()..output_match.start()].trim();
        let output_text = description[output_match.end()..output_end].trim();
        cursor = output_end.max(output_match.end());

        if input_text.is_empty() || output_text.is_empty() {
            continue;
        }

        cases.push(TestCase {
            id: format!("example_{}", cases.len() + 1),
            input: parse_arguments(input_text),
            expected_output: parse_literal(output_text),
        });
    }

    cases
}

/// Parse an example input line into positional arguments.
///
/// `nums = [2,7,11,15], target = 9` becomes `[[2,7,11,15], 9]`; a bare value
/// becomes a single argument.
pub fn parse_arguments(text: &str) -> Vec<Value> {
    let parts = split_top_level(text);
    let assignments: Vec<&str> = parts
        .iter()
        .filter_map(|part| ASSIGNMENT_RE.captures(part))
        .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
        .collect();

    if !assignments.is_empty() && assignments.len() == parts.len() {
        assignments.into_iter().map(parse_literal).collect()
    } else {
        vec![parse_literal(text)]
    }
}

/// Split on commas that are not nested in brackets or quotes
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') | (None, '{') | (None, '(') => depth += 1,
            (None, ']') | (None, '}') | (None, ')') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Parse one literal: JSON arrays/objects, quoted strings, booleans, null,
/// integers and floats. Anything else stays a string.
pub fn parse_literal(text: &str) -> Value {
    let text = text.trim();

    let bracketed = (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('{') && text.ends_with('}'));
    if bracketed {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            return value;
        }
    }

    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        return Value::String(text[1..text.len() - 1].to_string());
    }

    match text.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "none" => return Value::Null,
        _ => {}
    }

    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = text.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }

    Value::String(text.to_string())
}

/// Parse LLM-generated test cases: a JSON list, fenced as ```json or bare.
///
/// Entries without a string/number `id`, an array `input` or an
/// `expected_output` key are dropped.
pub fn parse_generated_test_cases(text: &str) -> Vec<TestCase> {
    let json = JSON_FENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim());

    if !json.starts_with('[') || !json.ends_with(']') {
        return Vec::new();
    }

    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(json) else {
        return Vec::new();
    };

    items.into_iter().filter_map(validate_test_case).collect()
}

fn validate_test_case(item: Value) -> Option<TestCase> {
    let Value::Object(mut map) = item else {
        return None;
    };
    let id = match map.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let Value::Array(input) = map.remove("input")? else {
        return None;
    };
    let expected_output = map.remove("expected_output")?;
    Some(TestCase {
        id,
        input,
        expected_output,
    })
}
