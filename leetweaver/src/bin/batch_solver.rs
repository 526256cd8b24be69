/*
  Batch solver: runs the single-problem workflow over a list of URLs.

  - One problem at a time, one browser session per problem
  - Problems already marked Success in the ledger are skipped
  - The ledger is saved after every problem, so an interrupted batch
    loses at most the run in progress

EXAMPLE COMMANDS:

  cargo run --bin batch-solver -- --urls problems.txt
  cargo run --bin batch-solver -- --urls problems.txt --max-problems 3 --headless
*/

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use leetweaver::bootstrap::{build_connector, build_orchestrator, format_summary, init_tracing, ledger_path};
use leetweaver::config::Config;
use leetweaver::ledger::ResultsLedger;
use leetweaver::llm::{GeminiClient, Generate};
use leetweaver::solver::cli::{parse_url_list, BatchArgs};
use leetweaver_sdk::{log_aggregate_stats, log_debug, log_info, log_progress, log_warning};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = BatchArgs::parse();
    init_tracing(args.flags.debug);
    args.validate()?;

    let mut config = Config::from_env()?;
    args.flags.apply(&mut config);
    if let Some(max) = args.max_problems {
        config.max_problems = max;
    }

    let content = tokio::fs::read_to_string(&args.urls)
        .await
        .with_context(|| format!("Failed to read URL list: {}", args.urls.display()))?;
    let (urls, rejected) = parse_url_list(&content);
    for line in &rejected {
        log_warning!("Skipping invalid problem URL: {}", line);
    }

    let path = ledger_path(&config);
    if args.flags.debug {
        log_debug!("{} URLs listed, ledger at {}", urls.len(), path.display());
    }
    let mut ledger = ResultsLedger::load(&path).await?;

    let pending: Vec<String> = urls
        .into_iter()
        .filter(|url| {
            let solved = ledger.is_solved(url);
            if solved {
                log_info!("Already solved, skipping: {}", url);
            }
            !solved
        })
        .take(config.max_problems)
        .collect();

    if pending.is_empty() {
        log_info!("Nothing to solve.");
        return Ok(());
    }

    let llm: Arc<dyn Generate> = Arc::new(GeminiClient::new(&config.llm)?);
    let connector = build_connector(&config)?;
    let orchestrator = build_orchestrator(llm, connector, &config);

    let total = pending.len();
    for (index, url) in pending.iter().enumerate() {
        log_progress!(index + 1, total, "problems");
        let state = orchestrator.run(url).await;
        println!("{}", format_summary(&state));
        println!();

        ledger.record(&state);
        if let Err(e) = ledger.save(&path).await {
            log_warning!("Could not update the results ledger: {:#}", e);
        }
    }

    log_aggregate_stats!(
        ledger.statistics.total_attempted,
        ledger.statistics.total_solved,
        ledger.statistics.accuracy
    );
    Ok(())
}
