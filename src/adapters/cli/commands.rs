//! CLI Commands
//!
//! Argument definitions for the `decision-executor` binary, plus the
//! decision-file reader and result report shared by its commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::application::{BatchSummary, ExecutionResult};
use crate::domain::{TradeDecision, TxReference, ValidationVerdict};

/// Executes strategy trade decisions against Jupiter on Solana
#[derive(Parser, Debug)]
#[command(
    name = "decision-executor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Validate, execute and record strategy trade decisions on Solana/Jupiter"
)]
pub struct CliApp {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a decision file and record every outcome
    Run(RunCmd),

    /// Check a decision file against the validation policy without trading
    Validate(ValidateCmd),
}

#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/executor.toml")]
    pub config: PathBuf,

    /// JSON file with the decisions to execute
    #[arg(short, long, value_name = "FILE")]
    pub decisions: PathBuf,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,

    /// Override the strategy assignment records are filed under
    #[arg(long, value_name = "ID")]
    pub strategy_assignment: Option<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ValidateCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/executor.toml")]
    pub config: PathBuf,

    /// JSON file with the decisions to check
    #[arg(short, long, value_name = "FILE")]
    pub decisions: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Accepted shapes of a decision file
#[derive(Deserialize)]
#[serde(untagged)]
enum DecisionFile {
    List(Vec<TradeDecision>),
    Wrapped { decisions: Vec<TradeDecision> },
}

/// Parse decisions from JSON: a bare array or `{"decisions": [...]}`
pub fn parse_decisions(json: &str) -> Result<Vec<TradeDecision>> {
    let file: DecisionFile = serde_json::from_str(json).context("Invalid decision file")?;
    Ok(match file {
        DecisionFile::List(decisions) | DecisionFile::Wrapped { decisions } => decisions,
    })
}

pub fn load_decisions(path: &Path) -> Result<Vec<TradeDecision>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read decisions from {}", path.display()))?;
    parse_decisions(&json)
}

fn tx_label(tx: Option<&TxReference>) -> String {
    match tx {
        Some(TxReference::Paper) => TxReference::PAPER_PLACEHOLDER.to_string(),
        Some(TxReference::Signature(sig)) => sig.clone(),
        None => "-".to_string(),
    }
}

/// Human-readable batch report
pub fn render_text_report(results: &[ExecutionResult]) -> String {
    let summary = BatchSummary::from_results(results);
    let mut out = String::new();
    for result in results {
        let status = if result.success { "OK  " } else { "FAIL" };
        out.push_str(&format!(
            "{} {} tx={}",
            status,
            result.decision,
            tx_label(result.tx_reference.as_ref())
        ));
        if let Some(error) = &result.error {
            out.push_str(&format!(" error=\"{}\"", error));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "{} succeeded, {} failed ({} unrecorded)\n",
        summary.succeeded, summary.failed, summary.persistence_failures
    ));
    out
}

/// Machine-readable batch report
pub fn render_json_report(results: &[ExecutionResult]) -> serde_json::Value {
    let summary = BatchSummary::from_results(results);
    serde_json::json!({
        "succeeded": summary.succeeded,
        "failed": summary.failed,
        "persistenceFailures": summary.persistence_failures,
        "results": results.iter().map(|r| serde_json::json!({
            "decision": r.decision,
            "success": r.success,
            "txReference": r.tx_reference,
            "error": r.error.as_ref().map(|e| e.to_string()),
            "stage": r.error.as_ref().map(|e| e.stage()),
        })).collect::<Vec<_>>(),
    })
}

/// Dry validation report, one line per actionable decision
pub fn render_validation_report(verdicts: &[(TradeDecision, ValidationVerdict)]) -> String {
    let mut out = String::new();
    for (decision, verdict) in verdicts {
        match &verdict.reason {
            None => out.push_str(&format!("PASS {}\n", decision)),
            Some(reason) => out.push_str(&format!("REJECT {}: {}\n", decision, reason)),
        }
    }
    let passed = verdicts.iter().filter(|(_, v)| v.is_valid).count();
    out.push_str(&format!("{}/{} decisions pass validation\n", passed, verdicts.len()));
    out
}
