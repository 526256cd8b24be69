/*
┌─────────────────────────────────────────────────────────────────────────────┐
│                           LEETWEAVER SOLVER                                  │
└─────────────────────────────────────────────────────────────────────────────┘

  PLANNING ──> CODING ──> [TESTING] ──> [OPTIMIZING] ──> SUBMITTING
                 ^                                          │
                 │                                          ├─> Accepted: SUCCESS
                 └──────────────── DEBUGGING <──────────────┘
                                                  (budget spent: FAILED)

EXAMPLE COMMANDS:

  # Solve one problem with the defaults from .env
  cargo run -- https://leetcode.com/problems/two-sum/

  # Headless, C++, three attempts
  cargo run -- https://leetcode.com/problems/two-sum/ \
    --headless --language cpp --max-iterations 3

  # Local testing through a sandbox command, plus one optimization pass
  cargo run -- https://leetcode.com/problems/two-sum/ \
    --sandbox-command "python3 sandbox/run.py" --optimize
*/

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use leetweaver::bootstrap::{build_connector, build_orchestrator, format_summary, init_tracing, ledger_path, record_run};
use leetweaver::config::Config;
use leetweaver::llm::{Generate, GeminiClient};
use leetweaver::solver::cli::Args;
use leetweaver_sdk::{log_debug, log_warning};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.flags.debug);
    args.validate()?;

    let mut config = Config::from_env()?;
    args.flags.apply(&mut config);
    if args.flags.debug {
        log_debug!(
            "model={} rpm={} max_iterations={} language={} sandbox={:?} optimize={}",
            config.llm.model,
            config.llm.requests_per_minute,
            config.max_iterations,
            config.language,
            config.sandbox_command,
            config.enable_optimization
        );
    }

    let llm: Arc<dyn Generate> = Arc::new(GeminiClient::new(&config.llm)?);
    let connector = build_connector(&config)?;
    let orchestrator = build_orchestrator(llm, connector, &config);

    let state = orchestrator.run(&args.url).await;

    println!();
    println!("{}", format_summary(&state));

    if let Err(e) = record_run(&ledger_path(&config), &state).await {
        log_warning!("Could not update the results ledger: {:#}", e);
    }
    Ok(())
}
