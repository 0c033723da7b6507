//! Live Trading Backend
//!
//! `TradingBackend` over Jupiter and a Solana RPC node:
//! - submit: quote -> build swap -> sign -> send
//! - confirm: poll signature status until confirmed or attempts run out
//! - swap details: settled amounts from the wallet's balance deltas

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{SwapDetails, Token, TransactionDetails};
use crate::ports::{BackendError, Sleeper, TokioSleeper, TradingBackend};
use super::jupiter::{JupiterClient, JupiterError, QuoteRequest, SwapRequest};
use super::solana::{SolanaClient, SolanaClientError, WalletError, WalletManager};

pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
pub const DEFAULT_CONFIRM_POLL_ATTEMPTS: u32 = 30;
pub const DEFAULT_CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

impl From<JupiterError> for BackendError {
    fn from(err: JupiterError) -> Self {
        match err {
            JupiterError::SlippageExceeded => BackendError::SlippageExceeded,
            JupiterError::InvalidTransaction(msg) => BackendError::InvalidParameters(msg),
            other => BackendError::ApiError(other.to_string()),
        }
    }
}

impl From<SolanaClientError> for BackendError {
    fn from(err: SolanaClientError) -> Self {
        match err {
            SolanaClientError::TransactionError(msg) => BackendError::TransactionFailed(msg),
            SolanaClientError::InvalidSignature(msg) => BackendError::InvalidParameters(msg),
            SolanaClientError::RpcError(msg) => BackendError::RpcError(msg),
        }
    }
}

impl From<WalletError> for BackendError {
    fn from(err: WalletError) -> Self {
        BackendError::SigningError(err.to_string())
    }
}

/// How long `confirm` waits for a signature to land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolling {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ConfirmPolling {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONFIRM_POLL_ATTEMPTS,
            interval: DEFAULT_CONFIRM_POLL_INTERVAL,
        }
    }
}

pub struct JupiterSwapBackend {
    jupiter: JupiterClient,
    solana: SolanaClient,
    wallet: WalletManager,
    slippage_bps: u16,
    polling: ConfirmPolling,
    sleeper: Arc<dyn Sleeper>,
}

impl JupiterSwapBackend {
    pub fn new(jupiter: JupiterClient, solana: SolanaClient, wallet: WalletManager) -> Self {
        Self {
            jupiter,
            solana,
            wallet,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            polling: ConfirmPolling::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    pub fn with_polling(mut self, polling: ConfirmPolling) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

#[async_trait]
impl TradingBackend for JupiterSwapBackend {
    async fn submit_trade(&self, from: &Token, amount: f64, to: &Token) -> Result<String, BackendError> {
        let base_units = from
            .to_base_units(amount)
            .filter(|units| *units > 0)
            .ok_or_else(|| BackendError::InvalidParameters(format!("amount {} of {}", amount, from.symbol)))?;

        let quote = self
            .jupiter
            .get_quote(&QuoteRequest::new(&from.address, &to.address, base_units, self.slippage_bps))
            .await?;
        tracing::debug!(
            "Quote {} {} -> {} {} (impact {:.4})",
            quote.in_amount, from.symbol, quote.out_amount, to.symbol, quote.price_impact()
        );

        let swap = self
            .jupiter
            .get_swap_transaction(&SwapRequest::new(self.wallet.public_key(), quote))
            .await?;
        let signed = self.wallet.sign_versioned_transaction(swap.decode_transaction()?)?;

        Ok(self.solana.send_versioned_transaction(&signed).await?)
    }

    async fn confirm(&self, signature: &str) -> Result<Option<TransactionDetails>, BackendError> {
        for poll in 0..self.polling.attempts {
            if poll > 0 {
                self.sleeper.sleep(self.polling.interval).await;
            }

            let Some(state) = self.solana.get_signature_status(signature).await? else {
                continue;
            };
            if let Some(err) = state.err {
                return Err(BackendError::TransactionFailed(err));
            }
            if state.is_confirmed() {
                return Ok(Some(TransactionDetails {
                    signature: signature.to_string(),
                    slot: state.slot,
                    confirmation_status: state.confirmation_status,
                }));
            }
        }

        tracing::debug!("{} not confirmed after {} polls", signature, self.polling.attempts);
        Ok(None)
    }

    async fn swap_details(
        &self,
        signature: &str,
        from: &Token,
        to: &Token,
    ) -> Result<Option<SwapDetails>, BackendError> {
        match self.solana.get_transaction_json(signature).await? {
            Some(tx) => settled_amounts(&tx, &self.wallet.public_key(), from, to).map(Some),
            None => Ok(None),
        }
    }
}

/// Amounts the owner actually sold and received in a confirmed swap
///
/// SPL legs use the owner's pre/post token balances for the mint. The
/// native SOL leg uses the fee payer's lamport delta with the network fee
/// added back. A leg with no movement in the expected direction is `None`.
pub fn settled_amounts(tx: &Value, owner: &str, from: &Token, to: &Token) -> Result<SwapDetails, BackendError> {
    let meta = tx
        .get("meta")
        .filter(|m| !m.is_null())
        .ok_or_else(|| BackendError::RpcError("getTransaction missing meta".to_string()))?;

    if let Some(err) = meta.get("err").filter(|e| !e.is_null()) {
        return Err(BackendError::TransactionFailed(err.to_string()));
    }

    let input = leg_delta(tx, meta, owner, from).and_then(|delta| positive_units(-delta));
    let output = leg_delta(tx, meta, owner, to).and_then(positive_units);

    Ok(SwapDetails {
        input_amount: input.map(|units| from.from_base_units(units)),
        output_amount: output.map(|units| to.from_base_units(units)),
    })
}

fn positive_units(delta: i128) -> Option<u64> {
    u64::try_from(delta).ok().filter(|units| *units > 0)
}

fn leg_delta(tx: &Value, meta: &Value, owner: &str, token: &Token) -> Option<i128> {
    if token.is_native_sol() {
        let fee = meta.get("fee").and_then(Value::as_u64).unwrap_or(0) as i128;
        payer_lamport_delta(tx, meta, owner).map(|delta| delta + fee)
    } else {
        Some(owner_mint_delta(meta, owner, &token.address))
    }
}

fn owner_mint_delta(meta: &Value, owner: &str, mint: &str) -> i128 {
    let sum = |key: &str| -> i128 {
        meta.get(key)
            .and_then(Value::as_array)
            .map(|balances| {
                balances
                    .iter()
                    .filter(|b| {
                        b.get("owner").and_then(Value::as_str) == Some(owner)
                            && b.get("mint").and_then(Value::as_str) == Some(mint)
                    })
                    .filter_map(|b| {
                        b.pointer("/uiTokenAmount/amount")
                            .and_then(Value::as_str)
                            .and_then(|a| a.parse::<i128>().ok())
                    })
                    .sum()
            })
            .unwrap_or(0)
    };
    sum("postTokenBalances") - sum("preTokenBalances")
}

fn payer_lamport_delta(tx: &Value, meta: &Value, owner: &str) -> Option<i128> {
    let payer = tx.pointer("/transaction/message/accountKeys/0").and_then(|k| {
        k.as_str().or_else(|| k.get("pubkey").and_then(Value::as_str))
    })?;
    if payer != owner {
        return None;
    }

    let pre = meta.pointer("/preBalances/0").and_then(Value::as_u64)? as i128;
    let post = meta.pointer("/postBalances/0").and_then(Value::as_u64)? as i128;
    Some(post - pre)
}
