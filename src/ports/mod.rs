//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Trade execution (swap submission, confirmation, settled amounts)
//! - Transaction record persistence
//! - Execution events (observability boundary)
//! - Time (backoff sleeps)

pub mod execution;
pub mod store;
pub mod events;
pub mod clock;
pub mod mocks;

pub use execution::{BackendError, TradingBackend};
pub use store::{StoreError, TransactionStore};
pub use events::{EventSink, ExecutionEvent, NoopEventSink};
pub use clock::{Sleeper, TokioSleeper};
