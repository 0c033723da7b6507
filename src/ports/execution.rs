//! Trading backend port
//!
//! The capability that actually moves funds: submit a swap, check its
//! on-chain status, and read back the normalized amounts it settled for.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{SwapDetails, Token, TransactionDetails};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction signing failed: {0}")]
    SigningError(String),
    #[error("Transaction failed on-chain: {0}")]
    TransactionFailed(String),
    #[error("Transaction not confirmed: {0}")]
    NotConfirmed(String),
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingBackend: Send + Sync {
    /// Sell `amount` (UI units) of `from` for `to`; returns the transaction signature
    ///
    /// Not idempotent: every call may move funds.
    async fn submit_trade(&self, from: &Token, amount: f64, to: &Token) -> Result<String, BackendError>;

    /// Current status of a submitted transaction, `None` if not yet visible
    async fn confirm(&self, signature: &str) -> Result<Option<TransactionDetails>, BackendError>;

    /// Settled input/output amounts, `None` if the transaction cannot be read
    async fn swap_details(
        &self,
        signature: &str,
        from: &Token,
        to: &Token,
    ) -> Result<Option<SwapDetails>, BackendError>;
}

#[async_trait]
impl<T: TradingBackend + ?Sized> TradingBackend for Arc<T> {
    async fn submit_trade(&self, from: &Token, amount: f64, to: &Token) -> Result<String, BackendError> {
        (**self).submit_trade(from, amount, to).await
    }

    async fn confirm(&self, signature: &str) -> Result<Option<TransactionDetails>, BackendError> {
        (**self).confirm(signature).await
    }

    async fn swap_details(
        &self,
        signature: &str,
        from: &Token,
        to: &Token,
    ) -> Result<Option<SwapDetails>, BackendError> {
        (**self).swap_details(signature, from, to).await
    }
}
