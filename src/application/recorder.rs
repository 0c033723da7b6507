//! Outcome Recorder
//!
//! Writes the single terminal record for a trade attempt.

use crate::domain::{
    PersistedRecord, SwapDetails, TokenPair, TradeSide, TransactionRecord, TxReference,
};
use crate::ports::{StoreError, TransactionStore};
use super::error::PipelineError;

pub struct OutcomeRecorder<S> {
    store: S,
}

impl<S: TransactionStore> OutcomeRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist an `OPEN` record with the settled amounts
    pub async fn record_success(
        &self,
        side: TradeSide,
        tokens: &TokenPair,
        tx_reference: TxReference,
        details: &SwapDetails,
        strategy_assignment_id: &str,
    ) -> Result<PersistedRecord, StoreError> {
        let record = TransactionRecord::success(
            side,
            &tokens.from,
            &tokens.to,
            tx_reference,
            details,
            strategy_assignment_id,
        );
        self.store.create_record(record).await
    }

    /// Persist a `FAILED` record carrying the error and its source chain
    pub async fn record_failure(
        &self,
        side: TradeSide,
        tokens: &TokenPair,
        error: &PipelineError,
        strategy_assignment_id: &str,
    ) -> Result<PersistedRecord, StoreError> {
        let record = TransactionRecord::failure(
            side,
            &tokens.from,
            &tokens.to,
            error.to_string(),
            failure_metadata(error),
            error.tx_reference(),
            strategy_assignment_id,
        );
        self.store.create_record(record).await
    }
}

/// Diagnostic payload stored with a failed record
pub fn failure_metadata(error: &PipelineError) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        "stage": error.stage(),
        "errorChain": error.chain(),
    });
    if let PipelineError::Submission { attempts, signatures, .. } = error {
        metadata["attempts"] = serde_json::json!(attempts);
        if !signatures.is_empty() {
            metadata["submittedSignatures"] = serde_json::json!(signatures);
        }
    }
    metadata
}
