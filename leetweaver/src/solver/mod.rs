//! Solver workflow module
//!
//! This module implements the iterative solver: analyze the statement, write
//! code, optionally test and optimize it locally, submit to the judge, and
//! debug rejected submissions until the verdict is Accepted or the iteration
//! budget runs out.
//!
//! ## Module Structure
//!
//! - `types` - Workflow state, verdicts, test artifacts, target language
//! - `parsing` - Extraction of code, plans and test cases from LLM text
//! - `agent` - Phase agent trait and prompt execution helper
//! - `phase0_analyze` - Constraints and plan
//! - `phase1_code` - Solution generation
//! - `phase2_test` - Local testing through the sandbox runner
//! - `phase3_debug` - Failure analysis and corrected code
//! - `phase4_optimize` - One complexity review per problem
//! - `workflow` - State machine orchestration
//! - `cli` - Command-line arguments

pub mod agent;
pub mod cli;
pub mod parsing;
pub mod phase0_analyze;
pub mod phase1_code;
pub mod phase3_debug;
pub mod phase4_optimize;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use agent::Agent;
pub use types::{Language, SubmissionResult, Verdict, WorkflowState, WorkflowStatus};
pub use workflow::{Orchestrator, WorkflowConfig};
