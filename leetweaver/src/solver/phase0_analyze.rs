//! Phase 0: Problem analysis
//!
//! Reads the problem statement and asks the model for constraints, a
//! suggested approach and a step-by-step plan. The plan feeds every later
//! coding attempt.

use std::sync::Arc;

use leetweaver_sdk::{async_trait, log_error, log_info};

use crate::llm::Generate;
use crate::solver::agent::{execute_prompt, Agent};
use crate::solver::parsing::parse_analysis;
use crate::solver::types::WorkflowState;

pub const AGENT_NAME: &str = "Problem Analyzer & Planner";

pub struct AnalyzerAgent {
    llm: Arc<dyn Generate>,
}

impl AnalyzerAgent {
    pub fn new(llm: Arc<dyn Generate>) -> Self {
        Self { llm }
    }
}

/// Build the analysis prompt for a problem statement
pub fn analysis_prompt(description: &str) -> String {
    format!(
        r#"Analyze the following LeetCode problem description:

Problem Description:
---
{description}
---

Perform the following tasks:
1.  **Identify Constraints:** List all explicit and implicit constraints mentioned (e.g., input size limits, value ranges, time/space complexity requirements). If none are obvious, state that.
2.  **Suggest Algorithms/Data Structures:** Based on the problem type and constraints, suggest 1-2 suitable algorithms and/or data structures. Briefly explain why they are appropriate.
3.  **Create Plan:** Outline a high-level step-by-step plan or pseudocode to implement the solution using one of the suggested approaches. Focus on the core logic.

Format the output clearly using the following headings:

## Constraints
- [Constraint 1]
- [Constraint 2]
...

## Suggested Approach
- **Algorithm/Data Structure:** [Name]
  - **Reasoning:** [Brief explanation]

## Plan/Pseudocode
1. [Step 1]
2. [Step 2]
...

Provide only the analysis based on the description. Do not write the full code solution yet.
"#
    )
}

#[async_trait]
impl Agent for AnalyzerAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn execute(&self, state: &mut WorkflowState) {
        let Some(description) = state.problem_description.clone().filter(|d| !d.trim().is_empty()) else {
            log_error!("Problem description is missing.");
            state.fail(format!("{}: Problem description is missing.", AGENT_NAME));
            return;
        };

        let prompt = analysis_prompt(&description);
        let Some(response) = execute_prompt(
            self.llm.as_ref(),
            state,
            AGENT_NAME,
            "Analyzing problem and drafting a plan",
            &prompt,
        )
        .await
        else {
            log_error!("LLM analysis returned an empty result.");
            state.error_message = Some(format!(
                "{}: LLM analysis failed to produce a result.",
                AGENT_NAME
            ));
            return;
        };

        let sections = parse_analysis(&response);
        log_info!(
            "Analysis complete. Plan generated: {}. Constraints identified: {}",
            !sections.plan.is_empty(),
            sections.constraints.len()
        );
        state.plan = Some(sections.plan).filter(|plan| !plan.trim().is_empty());
        state.constraints = Some(sections.constraints);
    }
}
