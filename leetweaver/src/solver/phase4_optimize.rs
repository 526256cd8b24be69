//! Phase 4: Optimization (optional, once per problem)

use std::sync::Arc;

use leetweaver_sdk::{async_trait, log_error, log_info, log_warning};

use crate::llm::Generate;
use crate::solver::agent::{execute_prompt, Agent};
use crate::solver::parsing::parse_fix_response;
use crate::solver::types::WorkflowState;

pub const AGENT_NAME: &str = "Optimization Agent";
pub const NO_OPTIMIZATION_ANALYSIS: &str = "LLM did not provide specific optimization analysis.";

pub struct OptimizationAgent {
    llm: Arc<dyn Generate>,
}

impl OptimizationAgent {
    pub fn new(llm: Arc<dyn Generate>) -> Self {
        Self { llm }
    }
}

pub fn optimization_prompt(state: &WorkflowState, code: &str) -> String {
    let lang = state.language.display_name();
    let tag = state.language.fence_tag();
    let constraints = match state.constraints.as_deref() {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => "Not provided.".to_string(),
    };

    format!(
        r#"You are an expert {lang} programmer specializing in algorithm optimization.
The following {lang} code solves a LeetCode problem.
Analyze the code for potential performance improvements, focusing on time and space complexity.
Consider the problem description and constraints if provided.

Problem Description:
---
{description}
---

Constraints:
---
{constraints}
---

Current Code:
---
```{tag}
{code}
```
---

Please perform the following:
1. **Analyze Complexity:** Determine the time and space complexity of the current solution. Explain your reasoning.
2. **Identify Bottlenecks:** Point out any specific parts of the code that are inefficient or could be improved.
3. **Suggest Optimizations:** Describe potential optimizations (e.g., different data structures, algorithms, or techniques) and their expected impact on complexity.
4. **(Optional but preferred) Provide Optimized Code:** If significant improvements are possible, provide the complete, optimized {lang} code within a single markdown code block (```{tag} ... ```). Keep the original functionality and class/method structure.

Format your response clearly. Start with the analysis, then provide the optimized code block if applicable.
"#,
        description = state.problem_description.as_deref().unwrap_or("Not provided."),
    )
}

#[async_trait]
impl Agent for OptimizationAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn execute(&self, state: &mut WorkflowState) {
        let Some(code) = state.current_code.clone().filter(|c| !c.trim().is_empty()) else {
            log_error!("Current code is missing for optimization analysis.");
            state.fail(format!("{}: Current code missing.", AGENT_NAME));
            return;
        };
        if state.constraints.is_none() {
            log_warning!("Constraints are missing. Optimization context may be limited.");
        }

        state.optimization_done = true;

        let prompt = optimization_prompt(state, &code);
        let Some(response) = execute_prompt(
            self.llm.as_ref(),
            state,
            AGENT_NAME,
            "Reviewing complexity",
            &prompt,
        )
        .await
        else {
            log_error!("LLM optimization analysis returned an empty result.");
            state.error_message = Some(format!(
                "{}: LLM failed to provide optimization analysis.",
                AGENT_NAME
            ));
            return;
        };

        let fix = parse_fix_response(&response, state.language);
        state.optimization_analysis =
            Some(fix.analysis.unwrap_or_else(|| NO_OPTIMIZATION_ANALYSIS.to_string()));

        let replaced = fix
            .code
            .filter(|optimized| optimized.trim() != code.trim())
            .is_some_and(|optimized| state.set_code(optimized));
        if replaced {
            log_info!("LLM provided optimized code. Updating current code.");
        } else {
            log_info!("No new optimized code. Keeping the current solution.");
        }
    }
}
