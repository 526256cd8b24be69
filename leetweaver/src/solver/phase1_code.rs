//! Phase 1: Code generation
//!
//! Writes a complete solution from the statement, the plan and the editor
//! template. On later iterations the prompt also carries the debugger's or
//! optimizer's analysis together with the previous attempt.

use std::sync::Arc;

use leetweaver_sdk::{async_trait, log_error, log_info, log_warning};

use crate::llm::Generate;
use crate::solver::agent::{execute_prompt, Agent};
use crate::solver::parsing::extract_code_block;
use crate::solver::types::{Language, WorkflowState};

pub const AGENT_NAME: &str = "Coding Agent";

pub struct CodingAgent {
    llm: Arc<dyn Generate>,
}

impl CodingAgent {
    pub fn new(llm: Arc<dyn Generate>) -> Self {
        Self { llm }
    }
}

/// Build the coding prompt from whatever the state currently holds
pub fn coding_prompt(state: &WorkflowState) -> String {
    let language = state.language;
    let lang = language.display_name();
    let tag = language.fence_tag();
    let mut lines: Vec<String> = vec![
        format!("You are an expert {} programmer tasked with solving a LeetCode problem.", lang),
        "Analyze the problem description, plan (if provided), constraints, and starting code template.".to_string(),
    ];

    if let Some(analysis) = state.debug_analysis.as_deref() {
        lines.extend(revision_section(
            "Debugging Analysis from previous attempt:",
            analysis,
            "Previous Code with bugs:",
            state.current_code.as_deref(),
            language,
        ));
        lines.push("\nFocus on applying the suggested fixes from the debugging analysis to the previous code.".to_string());
        lines.push("Ensure your new code directly addresses the identified issues.".to_string());
    } else if let Some(analysis) = state.optimization_analysis.as_deref() {
        lines.extend(revision_section(
            "Optimization Analysis of the previous solution:",
            analysis,
            "Previous Code:",
            state.current_code.as_deref(),
            language,
        ));
        lines.push("\nApply the suggested optimizations while keeping the solution correct.".to_string());
    } else {
        lines.push(format!("\nGenerate a complete {} solution based on the following details:", lang));
    }

    lines.push("\nProblem Description:".to_string());
    lines.push("---".to_string());
    lines.push(state.problem_description.clone().unwrap_or_default());
    lines.push("---".to_string());

    if let Some(plan) = state.plan.as_deref() {
        lines.push("\nPlan/Pseudocode:".to_string());
        lines.push("---".to_string());
        lines.push(plan.to_string());
        lines.push("---".to_string());
    }

    if let Some(constraints) = state.constraints.as_ref().filter(|c| !c.is_empty()) {
        lines.push("\nConstraints:".to_string());
        lines.push("---".to_string());
        lines.extend(constraints.iter().map(|c| format!("- {}", c)));
        lines.push("---".to_string());
    }

    match state.starting_code.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(template) => {
            lines.push("\nStarting Code Template (Your solution MUST use this structure):".to_string());
            lines.push(format!("```{}", tag));
            lines.push(template.to_string());
            lines.push("```".to_string());
            lines.push("---".to_string());
        }
        None => lines.push(
            "\nWarning: No starting code template provided. Ensure your solution defines the necessary class and method(s)."
                .to_string(),
        ),
    }

    lines.push("\nInstructions:".to_string());
    lines.push(format!("- Write a complete {} code solution.", lang));
    lines.push("- Adhere strictly to the class and method structure provided in the 'Starting Code Template' if available.".to_string());
    lines.push("- Implement the logic described in the plan or derived from the description.".to_string());
    lines.push("- Consider the constraints provided.".to_string());
    lines.push("- Optimize for clarity, efficiency (time and space complexity), and correctness.".to_string());
    lines.push("- Include necessary imports.".to_string());
    lines.push(format!(
        "- Provide ONLY the final {} code within a single markdown code block (```{} ... ```).",
        lang, tag
    ));
    lines.push("- Do NOT include explanations, comments outside the code, or any text before or after the code block.".to_string());

    lines.join("\n")
}

fn revision_section(
    analysis_heading: &str,
    analysis: &str,
    code_heading: &str,
    previous_code: Option<&str>,
    language: Language,
) -> Vec<String> {
    let placeholder = format!("{} No previous code provided", language.comment_prefixes()[0]);
    vec![
        "\nIMPORTANT: You are revising code based on previous feedback.".to_string(),
        analysis_heading.to_string(),
        "---".to_string(),
        analysis.to_string(),
        "---".to_string(),
        code_heading.to_string(),
        format!("```{}", language.fence_tag()),
        previous_code.map(str::to_string).unwrap_or(placeholder),
        "```".to_string(),
    ]
}

#[async_trait]
impl Agent for CodingAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn execute(&self, state: &mut WorkflowState) {
        if !state.has_description() {
            log_error!("Problem description is missing.");
            state.fail(format!("{}: Problem description missing.", AGENT_NAME));
            return;
        }
        if state.plan.is_none() {
            log_warning!("Plan is missing, proceeding with description and constraints only.");
        }
        if state.starting_code.as_deref().map_or(true, |c| c.trim().is_empty()) {
            log_warning!("Starting code template is missing. The generated structure may not match the judge.");
        }

        let prompt = coding_prompt(state);
        let Some(response) = execute_prompt(
            self.llm.as_ref(),
            state,
            AGENT_NAME,
            "Generating solution code",
            &prompt,
        )
        .await
        else {
            log_error!("LLM code generation returned an empty result.");
            state.error_message = Some(format!("{}: LLM failed to generate code.", AGENT_NAME));
            return;
        };

        let extracted = extract_code_block(&response, state.language);
        if extracted.is_some_and(|code| state.set_code(code)) {
            log_info!("Successfully generated and extracted {} code.", state.language);
            state.error_message = None;
        } else {
            log_error!("Failed to extract code from the LLM response.");
            state.error_message = Some(format!(
                "{}: Failed to extract code from LLM response.",
                AGENT_NAME
            ));
        }
    }
}
