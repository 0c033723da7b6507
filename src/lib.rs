//! Decision Executor - Trade decision execution for Solana via Jupiter
//!
//! Takes trade decisions produced by a strategy layer, validates them,
//! executes them as Jupiter swaps (or simulates them in paper mode) and
//! records exactly one outcome per decision.
//!
//! # Modules
//!
//! - `domain`: Core types and validation (TradeDecision, TransactionRecord, TradeValidator)
//! - `ports`: Trait abstractions (TradingBackend, TransactionStore, EventSink, Sleeper)
//! - `application`: Retry, swap execution, recording, pipeline and batch runner
//! - `adapters`: External implementations (Jupiter, Solana, stores, tracing, CLI)
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod ports;
pub mod application;
pub mod adapters;
pub mod config;
