//! Execution events
//!
//! The pipeline reports what it does as typed events instead of formatting
//! log lines inline. Rendering (tracing, metrics, alerts) is the sink's job.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{RecordStatus, TradeSide, TxReference};

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    BatchStarted {
        total: usize,
        actionable: usize,
        paper_trading: bool,
    },
    DecisionSkipped {
        description: String,
    },
    ValidationRejected {
        pair: String,
        reason: String,
    },
    SubmissionAttemptFailed {
        pair: String,
        attempt: u32,
        error: String,
        retry_in: Option<Duration>,
    },
    SwapSubmitted {
        pair: String,
        signature: String,
    },
    SwapConfirmed {
        signature: String,
        slot: u64,
    },
    PaperTradeSimulated {
        pair: String,
        side: TradeSide,
        amount: f64,
    },
    OutcomeRecorded {
        record_id: uuid::Uuid,
        status: RecordStatus,
        tx_reference: Option<TxReference>,
    },
    PersistenceFailed {
        pair: String,
        tx_reference: Option<TxReference>,
        error: String,
    },
    DecisionFailed {
        pair: String,
        stage: &'static str,
        error: String,
    },
    BatchCompleted {
        succeeded: usize,
        failed: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExecutionEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: ExecutionEvent) {
        (**self).emit(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: ExecutionEvent) {}
}
