//! Decision Executor
//!
//! Validates, executes and records strategy trade decisions on Solana via Jupiter.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use decision_executor::adapters::cli::{
    load_decisions, render_json_report, render_text_report, render_validation_report, CliApp,
    Command, OutputFormat, RunCmd, ValidateCmd,
};
use decision_executor::adapters::{
    JsonlTransactionStore, JupiterClient, JupiterSwapBackend, SolanaClient, TracingEventSink,
    WalletManager,
};
use decision_executor::application::{
    BatchSummary, DecisionBatchRunner, ExecutionContext, OutcomeRecorder, RetryRunner,
    SwapExecutor, TradeExecutionPipeline,
};
use decision_executor::config::{load_config, Config};
use decision_executor::domain::TradeValidator;
use decision_executor::ports::EventSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the TOML config)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    match app.command {
        Command::Run(cmd) => {
            let config = load_config(&cmd.config)
                .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;
            init_logging(app.verbose, app.debug, &config.logging.level);
            run_command(cmd, config).await
        }
        Command::Validate(cmd) => {
            let config = load_config(&cmd.config)
                .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;
            init_logging(app.verbose, app.debug, &config.logging.level);
            validate_command(cmd, config)
        }
    }
}

/// RUST_LOG wins, then --debug / --verbose, then the configured level
fn init_logging(verbose: bool, debug: bool, config_level: &str) {
    let fallback = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    let paper_trading = cmd.paper || config.execution.paper_trading;
    let strategy_assignment_id = cmd
        .strategy_assignment
        .clone()
        .unwrap_or_else(|| config.execution.strategy_assignment_id.clone());
    if strategy_assignment_id.trim().is_empty() {
        bail!("strategy assignment id cannot be empty");
    }

    let decisions = load_decisions(&cmd.decisions)?;
    tracing::info!("Loaded {} decisions from {}", decisions.len(), cmd.decisions.display());

    if paper_trading {
        tracing::warn!("PAPER TRADING MODE - no real transactions");
    }

    let keypair_path = config.solana.get_keypair_path();
    let wallet = match load_wallet_with_context(&keypair_path, paper_trading) {
        Ok(w) => w,
        Err(e) if paper_trading => {
            tracing::warn!("{:#} - using random wallet for paper trading", e);
            WalletManager::new_random()
        }
        Err(e) => return Err(e),
    };
    tracing::info!("Wallet: {}", wallet.public_key());

    let jupiter = JupiterClient::with_config(config.jupiter.client_config())
        .context("Failed to create Jupiter client")?;
    let solana = SolanaClient::new(config.solana.get_rpc_url());
    tracing::info!("RPC: {}", solana.url());
    let backend = JupiterSwapBackend::new(jupiter, solana, wallet)
        .with_slippage_bps(config.jupiter.slippage_bps)
        .with_polling(config.solana.confirm_polling());

    if !config.store.accepts_assignment(&strategy_assignment_id) {
        bail!("strategy assignment '{}' is not in store.known_assignments", strategy_assignment_id);
    }
    let mut store = JsonlTransactionStore::new(config.store.resolved_path());
    if !config.store.known_assignments.is_empty() {
        store = store.with_known_assignments(config.store.known_assignments.clone());
    }
    tracing::info!("Recording outcomes to {}", store.path().display());

    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let executor = SwapExecutor::new(backend, RetryRunner::new(config.execution.retry_policy()))
        .with_mode(config.execution.submission_mode)
        .with_events(events.clone());
    let pipeline = TradeExecutionPipeline::new(
        TradeValidator::new(config.validation.clone()),
        executor,
        OutcomeRecorder::new(store),
    )
    .with_events(events);
    let runner = DecisionBatchRunner::new(pipeline)
        .with_strategy(config.execution.execution_strategy());

    let context = ExecutionContext {
        decisions,
        strategy_assignment_id,
        is_paper_trading: paper_trading,
    };
    let results = runner.run(&context).await;

    match cmd.format {
        OutputFormat::Text => print!("{}", render_text_report(&results)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json_report(&results))?),
    }

    let summary = BatchSummary::from_results(&results);
    if summary.persistence_failures > 0 {
        bail!(
            "{} outcome(s) could not be recorded; reconcile them from the log above",
            summary.persistence_failures
        );
    }
    Ok(())
}

fn validate_command(cmd: ValidateCmd, config: Config) -> Result<()> {
    let decisions = load_decisions(&cmd.decisions)?;
    let validator = TradeValidator::new(config.validation);

    let verdicts: Vec<_> = decisions
        .into_iter()
        .filter(|d| d.is_actionable())
        .map(|d| {
            let verdict = validator.validate_decision(&d);
            (d, verdict)
        })
        .collect();

    print!("{}", render_validation_report(&verdicts));
    Ok(())
}

/// Load wallet with helpful error messages
fn load_wallet_with_context(keypair_path: &Path, is_paper_mode: bool) -> Result<WalletManager> {
    if !keypair_path.exists() {
        let mode_hint = if is_paper_mode {
            "In paper mode, a random wallet will be used instead."
        } else {
            "A wallet is required for live trading."
        };

        bail!(
            "Wallet file not found: {}\n\n\
             {}\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}",
            keypair_path.display(),
            mode_hint,
            keypair_path.display()
        );
    }

    WalletManager::from_file(keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path.display(),
            e
        )
    })
}
