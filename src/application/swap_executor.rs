//! Swap Executor
//!
//! Drives one live swap through submit -> confirm -> extract.
//!
//! In `Resubmit` mode submit and confirm are retried together, so a
//! confirmation timeout re-submits the swap. `SubmitOnce` submits exactly
//! once and only retries confirmation of that signature.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{SwapDetails, Token, TransactionDetails};
use crate::ports::{BackendError, EventSink, ExecutionEvent, NoopEventSink, TradingBackend};
use super::error::PipelineError;
use super::retry::RetryRunner;

/// How failures after submission are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    /// Retry submit+confirm as one unit (may submit more than once)
    #[default]
    Resubmit,
    /// Submit once, retry confirmation only
    SubmitOnce,
}

/// A submitted and confirmed swap
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedSwap {
    pub signature: String,
    pub details: TransactionDetails,
}

pub struct SwapExecutor<B> {
    backend: B,
    retry: RetryRunner,
    mode: SubmissionMode,
    events: Arc<dyn EventSink>,
}

impl<B: TradingBackend> SwapExecutor<B> {
    pub fn new(backend: B, retry: RetryRunner) -> Self {
        Self {
            backend,
            retry,
            mode: SubmissionMode::default(),
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_mode(mut self, mode: SubmissionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Submit and confirm a swap of `amount` `from` into `to`
    pub async fn execute_swap(
        &self,
        from: &Token,
        amount: f64,
        to: &Token,
    ) -> Result<ConfirmedSwap, PipelineError> {
        match self.mode {
            SubmissionMode::Resubmit => self.submit_and_confirm_with_retry(from, amount, to).await,
            SubmissionMode::SubmitOnce => self.submit_once_then_confirm(from, amount, to).await,
        }
    }

    async fn submit_and_confirm_with_retry(
        &self,
        from: &Token,
        amount: f64,
        to: &Token,
    ) -> Result<ConfirmedSwap, PipelineError> {
        let pair = format!("{}/{}", from.symbol, to.symbol);
        let backend = &self.backend;
        let events = &self.events;
        let pair_ref = pair.as_str();
        let submitted: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let submitted_ref = &submitted;

        let operation = move || async move {
            let signature = backend.submit_trade(from, amount, to).await?;
            if let Ok(mut sent) = submitted_ref.lock() {
                sent.push(signature.clone());
            }
            events.emit(ExecutionEvent::SwapSubmitted {
                pair: pair_ref.to_string(),
                signature: signature.clone(),
            });
            let details = require_confirmed(backend.confirm(&signature).await?, &signature)?;
            Ok::<_, BackendError>(ConfirmedSwap { signature, details })
        };

        let observer = self.attempt_observer(&pair);
        let swap = self
            .retry
            .run_observed(operation, &observer)
            .await
            .map_err(|e| PipelineError::Submission {
                attempts: e.attempts,
                signatures: submitted
                    .lock()
                    .map(|sent| sent.clone())
                    .unwrap_or_default(),
                source: e.last_error,
            })?;

        self.emit_confirmed(&swap);
        Ok(swap)
    }

    async fn submit_once_then_confirm(
        &self,
        from: &Token,
        amount: f64,
        to: &Token,
    ) -> Result<ConfirmedSwap, PipelineError> {
        let pair = format!("{}/{}", from.symbol, to.symbol);

        let signature = self
            .backend
            .submit_trade(from, amount, to)
            .await
            .map_err(|source| PipelineError::Submission {
                attempts: 1,
                signatures: Vec::new(),
                source,
            })?;
        self.events.emit(ExecutionEvent::SwapSubmitted {
            pair: pair.clone(),
            signature: signature.clone(),
        });

        let backend = &self.backend;
        let sig = signature.as_str();
        let operation = move || async move {
            require_confirmed(backend.confirm(sig).await?, sig)
        };

        let observer = self.attempt_observer(&pair);
        let details = self
            .retry
            .run_observed(operation, &observer)
            .await
            .map_err(|e| PipelineError::Submission {
                attempts: e.attempts,
                signatures: vec![signature.clone()],
                source: e.last_error,
            })?;

        let swap = ConfirmedSwap { signature, details };
        self.emit_confirmed(&swap);
        Ok(swap)
    }

    /// Read settled amounts for a confirmed swap
    ///
    /// Not retried: a confirmed transaction's data is final. Missing
    /// amounts make the trade invalid.
    pub async fn fetch_swap_details(
        &self,
        signature: &str,
        from: &Token,
        to: &Token,
    ) -> Result<SwapDetails, PipelineError> {
        let details = self
            .backend
            .swap_details(signature, from, to)
            .await
            .map_err(|source| PipelineError::SwapDetailLookup {
                signature: signature.to_string(),
                source,
            })?;

        match details {
            Some(details) if details.is_complete() => Ok(details),
            _ => Err(PipelineError::InvalidSwapDetails {
                signature: signature.to_string(),
            }),
        }
    }

    fn attempt_observer<'a>(
        &'a self,
        pair: &'a str,
    ) -> impl Fn(u32, &BackendError, Option<Duration>) + Send + Sync + 'a {
        move |attempt, error, retry_in| {
            self.events.emit(ExecutionEvent::SubmissionAttemptFailed {
                pair: pair.to_string(),
                attempt,
                error: error.to_string(),
                retry_in,
            });
        }
    }

    fn emit_confirmed(&self, swap: &ConfirmedSwap) {
        self.events.emit(ExecutionEvent::SwapConfirmed {
            signature: swap.signature.clone(),
            slot: swap.details.slot,
        });
    }
}

fn require_confirmed(
    details: Option<TransactionDetails>,
    signature: &str,
) -> Result<TransactionDetails, BackendError> {
    details.ok_or_else(|| BackendError::NotConfirmed(signature.to_string()))
}
