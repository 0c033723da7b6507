//! Adapters Layer - External System Implementations
//!
//! Concrete implementations of the port traits:
//! - Jupiter: DEX aggregator API client
//! - Solana: RPC client and wallet management
//! - Backend: live `TradingBackend` over Jupiter + Solana
//! - Store: JSON-lines and in-memory transaction stores
//! - Telemetry: `tracing` event sink
//! - CLI: Command-line interface definitions

pub mod jupiter;
pub mod solana;
pub mod backend;
pub mod store;
pub mod telemetry;
pub mod cli;

pub use jupiter::JupiterClient;
pub use solana::{SolanaClient, WalletManager};
pub use backend::{ConfirmPolling, JupiterSwapBackend};
pub use store::{InMemoryTransactionStore, JsonlTransactionStore};
pub use telemetry::TracingEventSink;
pub use cli::CliApp;
