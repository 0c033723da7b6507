//! Configuration Loader
//!
//! Loads and validates the executor's TOML configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::backend::{ConfirmPolling, DEFAULT_SLIPPAGE_BPS};
use crate::adapters::jupiter::{JupiterConfig, DEFAULT_JUPITER_API_URL};
use crate::application::{ExecutionStrategy, RetryPolicy, SubmissionMode, DEFAULT_MAX_RETRIES};
use crate::domain::ValidationPolicy;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub execution: ExecutionSection,
    #[serde(default)]
    pub validation: ValidationPolicy,
    #[serde(default)]
    pub jupiter: JupiterSection,
    pub solana: SolanaSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// How `execution_strategy` is spelled in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Serial,
    BoundedParallel,
}

/// Batch execution section
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionSection {
    /// Simulate every trade instead of submitting it
    #[serde(default)]
    pub paper_trading: bool,
    /// Strategy assignment all records are filed under
    pub strategy_assignment_id: String,
    /// Retries after the first submission attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay; doubles per retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default)]
    pub submission_mode: SubmissionMode,
    #[serde(default)]
    pub execution_strategy: StrategyKind,
    /// Only used by `bounded_parallel`
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_in_flight() -> usize {
    1
}

impl ExecutionSection {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    pub fn execution_strategy(&self) -> ExecutionStrategy {
        match self.execution_strategy {
            StrategyKind::Serial => ExecutionStrategy::Serial,
            StrategyKind::BoundedParallel => ExecutionStrategy::BoundedParallel {
                max_in_flight: self.max_in_flight,
            },
        }
    }
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterSection {
    #[serde(default = "default_jupiter_url")]
    pub api_url: String,
    /// Optional API key for higher rate limits (get from jup.ag)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Slippage tolerance in basis points (0.5% = 50 bps)
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_jupiter_url() -> String {
    DEFAULT_JUPITER_API_URL.to_string()
}

fn default_slippage_bps() -> u16 {
    DEFAULT_SLIPPAGE_BPS
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: default_jupiter_url(),
            api_key: None,
            slippage_bps: default_slippage_bps(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl JupiterSection {
    /// API key from config, falling back to JUPITER_API_KEY
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("JUPITER_API_KEY").ok())
    }

    pub fn client_config(&self) -> JupiterConfig {
        JupiterConfig {
            api_base_url: self.api_url.clone(),
            api_key: self.get_api_key(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..JupiterConfig::default()
        }
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint (use private RPC for production)
    pub rpc_url: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
    #[serde(default = "default_confirm_poll_attempts")]
    pub confirm_poll_attempts: u32,
    #[serde(default = "default_confirm_poll_interval_ms")]
    pub confirm_poll_interval_ms: u64,
}

fn default_confirm_poll_attempts() -> u32 {
    30
}

fn default_confirm_poll_interval_ms() -> u64 {
    1_000
}

impl SolanaSection {
    /// RPC URL, SOLANA_RPC_URL wins over the file
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Keypair path with `~` expanded, SOLANA_KEYPAIR_PATH wins over the file
    pub fn get_keypair_path(&self) -> PathBuf {
        let raw = std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone());
        PathBuf::from(shellexpand::tilde(&raw).into_owned())
    }

    pub fn confirm_polling(&self) -> ConfirmPolling {
        ConfirmPolling {
            attempts: self.confirm_poll_attempts,
            interval: Duration::from_millis(self.confirm_poll_interval_ms),
        }
    }
}

/// Transaction log section
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Assignments records may be filed under; empty accepts any
    #[serde(default)]
    pub known_assignments: Vec<String>,
}

fn default_store_path() -> String {
    "data/transactions.jsonl".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            known_assignments: Vec::new(),
        }
    }
}

impl StoreSection {
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }

    /// Whether records for `assignment` would be accepted
    pub fn accepts_assignment(&self, assignment: &str) -> bool {
        self.known_assignments.is_empty() || self.known_assignments.iter().any(|a| a == assignment)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

fn invalid(msg: String) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(msg))
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return invalid(format!("{} must be in (0, 1], got {}", name, value));
    }
    Ok(())
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Execution
        if self.execution.strategy_assignment_id.trim().is_empty() {
            return invalid("strategy_assignment_id cannot be empty".to_string());
        }
        if self.execution.max_in_flight == 0 {
            return invalid("max_in_flight must be >= 1".to_string());
        }
        if self.execution.max_retries > 10 {
            return invalid(format!("max_retries must be <= 10, got {}", self.execution.max_retries));
        }

        // Validation policy
        let policy = &self.validation;
        if !(0.0..=1.0).contains(&policy.min_trust_score) {
            return invalid(format!("min_trust_score must be 0-1, got {}", policy.min_trust_score));
        }
        if policy.min_liquidity_usd < 0.0 {
            return invalid(format!("min_liquidity_usd must be >= 0, got {}", policy.min_liquidity_usd));
        }
        check_fraction("max_liquidity_fraction", policy.max_liquidity_fraction)?;
        check_fraction("max_volume_fraction", policy.max_volume_fraction)?;
        check_fraction("max_slippage", policy.max_slippage)?;
        check_fraction("max_position_liquidity_fraction", policy.max_position_liquidity_fraction)?;

        // Jupiter
        if self.jupiter.api_url.is_empty() {
            return invalid("api_url cannot be empty".to_string());
        }
        if self.jupiter.slippage_bps == 0 || self.jupiter.slippage_bps > 10_000 {
            return invalid(format!("slippage_bps must be 1-10000, got {}", self.jupiter.slippage_bps));
        }

        // Solana
        if self.solana.rpc_url.is_empty() {
            return invalid("rpc_url cannot be empty".to_string());
        }
        if self.solana.keypair_path.is_empty() {
            return invalid("keypair_path cannot be empty".to_string());
        }
        if self.solana.confirm_poll_attempts == 0 {
            return invalid("confirm_poll_attempts must be >= 1".to_string());
        }

        // Store / logging
        if self.store.path.is_empty() {
            return invalid("store path cannot be empty".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return invalid(format!("unknown log level '{}'", self.logging.level));
        }

        Ok(())
    }
}
