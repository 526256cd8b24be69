//! Phase 3: Debugging
//!
//! Explains the latest failure (rejected submission first, failing local
//! tests second) and usually proposes corrected code. Analysis without code
//! is still useful: the coder picks it up on the next iteration.

use std::sync::Arc;

use leetweaver_sdk::{async_trait, log_error, log_info, log_warning};

use crate::llm::Generate;
use crate::solver::agent::{execute_prompt, Agent};
use crate::solver::parsing::{failure_context, parse_fix_response};
use crate::solver::types::WorkflowState;

pub const AGENT_NAME: &str = "Debugging Agent";
pub const NO_SPECIFIC_ANALYSIS: &str = "LLM did not provide specific analysis.";

pub struct DebuggingAgent {
    llm: Arc<dyn Generate>,
}

impl DebuggingAgent {
    pub fn new(llm: Arc<dyn Generate>) -> Self {
        Self { llm }
    }
}

/// Build the debugging prompt around a rendered failure context
pub fn debugging_prompt(state: &WorkflowState, code: &str, failure_context: &str) -> String {
    let lang = state.language.display_name();
    let tag = state.language.fence_tag();
    let mut lines: Vec<String> = vec![
        format!("You are an expert {} programmer acting as a debugger.", lang),
        format!(
            "The following {} code was written to solve a LeetCode problem, but it failed.",
            lang
        ),
        "Analyze the code, the problem description, the plan (if available), the required starting code structure, and the failure context provided below.".to_string(),
        "\nProblem Description:".to_string(),
        "---".to_string(),
        state.problem_description.clone().unwrap_or_default(),
        "---".to_string(),
    ];

    if let Some(plan) = state.plan.as_deref() {
        lines.push("\nOriginal Plan/Pseudocode:".to_string());
        lines.push("---".to_string());
        lines.push(plan.to_string());
        lines.push("---".to_string());
    }

    if let Some(template) = state.starting_code.as_deref().filter(|c| !c.trim().is_empty()) {
        lines.push("\nRequired Starting Code Structure (The corrected code MUST use this):".to_string());
        lines.push(format!("```{}", tag));
        lines.push(template.to_string());
        lines.push("```".to_string());
        lines.push("---".to_string());
    }

    lines.extend([
        "\nCode with potential bugs:".to_string(),
        "---".to_string(),
        format!("```{}", tag),
        code.to_string(),
        "```".to_string(),
        "---".to_string(),
        "\nFailure Context:".to_string(),
        "---".to_string(),
        failure_context.to_string(),
        "---".to_string(),
    ]);

    lines.extend(
        [
            "\nIMPORTANT Analysis Instructions:",
            "- Carefully analyze the 'Failure Context'. It contains the reason for failure (e.g., 'Wrong Answer', 'Time Limit Exceeded', 'Runtime Error').",
            "- If 'Wrong Answer', focus on the 'Last Testcase', 'Expected Output', and the code's logic to understand why it produced an incorrect result for that input.",
            "- If 'Time Limit Exceeded', analyze the code's time complexity. Identify bottlenecks relative to the problem constraints and suggest a more efficient approach.",
            "- If 'Runtime Error', examine the error message and the 'Last Testcase' that triggered it. Pinpoint the cause (e.g., division by zero, index out of bounds).",
            "- If 'Compile Error', identify the syntax error in the code.",
            "\nPlease perform the following:",
            "1. **Identify the bug(s):** Based specifically on the failure context, explain the root cause of the failure.",
            "2. **Suggest a fix:** Describe precisely how to correct the identified bug(s).",
        ]
        .map(str::to_string),
    );
    lines.push(format!(
        "3. **Provide Corrected Code:** Provide the complete, corrected {} code within a single markdown code block (```{} ... ```). It must strictly adhere to the required starting code structure and be ready for direct submission.",
        lang, tag
    ));
    lines.push("   If you believe the original code was actually correct despite the failure, explain why and do NOT include a code block.".to_string());
    lines.push("\nFormat your response clearly: start with the analysis, then provide the corrected code block only if a correction was identified.".to_string());

    lines.join("\n")
}

#[async_trait]
impl Agent for DebuggingAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn execute(&self, state: &mut WorkflowState) {
        let Some(code) = state.current_code.clone().filter(|c| !c.trim().is_empty()) else {
            log_error!("Current code is missing for debugging.");
            state.fail(format!("{}: Current code missing.", AGENT_NAME));
            return;
        };
        if state.starting_code.as_deref().map_or(true, |c| c.trim().is_empty()) {
            log_warning!("Starting code template is missing. Debugging might be less effective.");
        }

        let Some(context) = failure_context(state) else {
            log_error!("No failure context (failed tests or submission error) found for debugging.");
            state.error_message = Some(format!("{}: No failure context provided.", AGENT_NAME));
            return;
        };

        let prompt = debugging_prompt(state, &code, &context);
        let Some(response) = execute_prompt(
            self.llm.as_ref(),
            state,
            AGENT_NAME,
            "Analyzing failure",
            &prompt,
        )
        .await
        else {
            log_error!("LLM debugging analysis returned an empty result.");
            state.error_message = Some(format!(
                "{}: LLM failed to provide debugging analysis.",
                AGENT_NAME
            ));
            return;
        };

        let fix = parse_fix_response(&response, state.language);
        let analysis = fix.analysis.unwrap_or_else(|| NO_SPECIFIC_ANALYSIS.to_string());
        tracing::debug!(analysis = %analysis, "debugging analysis received");
        state.debug_analysis = Some(analysis);

        if fix.code.is_some_and(|corrected| state.set_code(corrected)) {
            log_info!("LLM provided corrected code. Updating current code.");
            state.error_message = None;
        } else {
            log_info!("No corrected code block. The analysis goes to the next coding attempt.");
        }
    }
}
