//! Tracing Event Sink
//!
//! Renders execution events as `tracing` log lines. Rejections and failed
//! attempts are warnings; anything that leaves a trade unrecorded is an error.

use crate::ports::{EventSink, ExecutionEvent};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: ExecutionEvent) {
        match event {
            ExecutionEvent::BatchStarted { total, actionable, paper_trading } => {
                let mode = if paper_trading { "PAPER" } else { "LIVE" };
                tracing::info!("[{}] Executing {} of {} decisions", mode, actionable, total);
            }
            ExecutionEvent::DecisionSkipped { description } => {
                tracing::debug!("Skipping non-actionable decision: {}", description);
            }
            ExecutionEvent::ValidationRejected { pair, reason } => {
                tracing::warn!("{} rejected by validator: {}", pair, reason);
            }
            ExecutionEvent::SubmissionAttemptFailed { pair, attempt, error, retry_in } => match retry_in {
                Some(delay) => tracing::warn!(
                    "{} swap attempt {} failed: {} (retrying in {:?})",
                    pair, attempt, error, delay
                ),
                None => tracing::warn!("{} swap attempt {} failed: {} (giving up)", pair, attempt, error),
            },
            ExecutionEvent::SwapSubmitted { pair, signature } => {
                tracing::info!("{} swap submitted: {}", pair, signature);
            }
            ExecutionEvent::SwapConfirmed { signature, slot } => {
                tracing::info!("Swap {} confirmed at slot {}", signature, slot);
            }
            ExecutionEvent::PaperTradeSimulated { pair, side, amount } => {
                tracing::info!("[PAPER] Simulated {} {} {}", side, amount, pair);
            }
            ExecutionEvent::OutcomeRecorded { record_id, status, tx_reference } => {
                let tx = tx_reference.map_or_else(|| "-".to_string(), |t| t.to_string());
                tracing::info!("Recorded {:?} outcome {} (tx {})", status, record_id, tx);
            }
            ExecutionEvent::PersistenceFailed { pair, tx_reference, error } => {
                let tx = tx_reference.map_or_else(|| "-".to_string(), |t| t.to_string());
                tracing::error!("{} outcome NOT recorded (tx {}): {}", pair, tx, error);
            }
            ExecutionEvent::DecisionFailed { pair, stage, error } => {
                tracing::error!("{} failed at {}: {}", pair, stage, error);
            }
            ExecutionEvent::BatchCompleted { succeeded, failed } => {
                tracing::info!("Batch complete: {} succeeded, {} failed", succeeded, failed);
            }
        }
    }
}
