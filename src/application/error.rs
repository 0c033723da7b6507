use thiserror::Error;

use crate::domain::{RecordStatus, TxReference};
use crate::ports::{BackendError, StoreError};

/// Why a decision did not produce an `OPEN` record
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// Rejected by the validator before any backend call
    #[error("{reason}")]
    Validation { reason: String },

    /// Submission or confirmation failed, retries exhausted
    #[error("Swap submission failed after {attempts} attempts: {source}")]
    Submission {
        attempts: u32,
        /// Every transaction sent but never confirmed, oldest first
        signatures: Vec<String>,
        source: BackendError,
    },

    /// Confirmed, but the settled amounts could not be read
    #[error("Swap detail lookup failed: {source}")]
    SwapDetailLookup { signature: String, source: BackendError },

    /// Confirmed, but input or output amount is missing
    #[error("Invalid swap details")]
    InvalidSwapDetails { signature: String },

    /// The outcome record itself could not be written
    #[error("Failed to persist {status:?} record: {source}")]
    Persistence {
        status: RecordStatus,
        tx_reference: Option<TxReference>,
        /// The trade failure being recorded, if any
        trade_error: Option<Box<PipelineError>>,
        source: StoreError,
    },
}

impl PipelineError {
    /// Stage of the pipeline the error came from
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation { .. } => "validation",
            PipelineError::Submission { .. } => "submission",
            PipelineError::SwapDetailLookup { .. } | PipelineError::InvalidSwapDetails { .. } => {
                "swap_details"
            }
            PipelineError::Persistence { .. } => "persistence",
        }
    }

    /// Bookkeeping fault rather than a trade fault
    pub fn is_persistence(&self) -> bool {
        matches!(self, PipelineError::Persistence { .. })
    }

    /// Transaction the failed attempt left behind, if any
    pub fn tx_reference(&self) -> Option<TxReference> {
        match self {
            PipelineError::Validation { .. } => None,
            PipelineError::Submission { signatures, .. } => {
                signatures.last().cloned().map(TxReference::Signature)
            }
            PipelineError::SwapDetailLookup { signature, .. }
            | PipelineError::InvalidSwapDetails { signature } => {
                Some(TxReference::Signature(signature.clone()))
            }
            PipelineError::Persistence { tx_reference, .. } => tx_reference.clone(),
        }
    }

    /// Error messages from this error down its source chain
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}
