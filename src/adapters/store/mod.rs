//! Transaction Store Adapters
//!
//! - `jsonl`: append-only JSON-lines file, one record per line
//! - `memory`: process-local store for tests and embedding

mod jsonl;
mod memory;

pub use jsonl::{JsonlTransactionStore, DEFAULT_STORE_FILE};
pub use memory::InMemoryTransactionStore;
