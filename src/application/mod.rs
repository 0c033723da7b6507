//! Application Layer - Decision Execution Use Cases
//!
//! - `retry`: bounded exponential backoff around an async operation
//! - `swap_executor`: submit, confirm and read back a swap
//! - `recorder`: one terminal record per decision
//! - `pipeline`: validate -> execute -> record for a single decision
//! - `batch`: run a decision set with per-decision isolation

pub mod retry;
pub mod error;
pub mod swap_executor;
pub mod recorder;
pub mod pipeline;
pub mod batch;

pub use retry::{RetryError, RetryPolicy, RetryRunner, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
pub use error::PipelineError;
pub use swap_executor::{ConfirmedSwap, SubmissionMode, SwapExecutor};
pub use recorder::{failure_metadata, OutcomeRecorder};
pub use pipeline::TradeExecutionPipeline;
pub use batch::{
    BatchSummary, DecisionBatchRunner, ExecutionContext, ExecutionResult, ExecutionStrategy,
};
