//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, ExecutionSection, JupiterSection, LoggingSection, SolanaSection,
    StoreSection, StrategyKind, load_config, parse_config,
};
