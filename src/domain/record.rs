//! Transaction Records
//!
//! The append-only bookkeeping row written once per attempted decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::TradeSide;
use super::swap::{SwapDetails, TxReference};
use super::token::Token;

/// Lifecycle status of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    /// Swap executed, position open
    Open,
    /// Attempt failed at some stage
    Failed,
}

/// Profit/loss of a recorded trade
///
/// Nothing in this subsystem can compute realized P/L (it needs the
/// matching entry of a position), so records are written as `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProfitLoss {
    #[default]
    Unset,
    Realized { amount_usd: f64, pct: f64 },
}

/// Identity of a token as stored on a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    pub logo_uri: Option<String>,
}

impl From<&Token> for TokenSnapshot {
    fn from(token: &Token) -> Self {
        Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            logo_uri: token.logo_uri.clone(),
        }
    }
}

/// Persisted outcome of one trade attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub side: TradeSide,
    pub status: RecordStatus,
    /// Mirrors `side`
    #[serde(rename = "type")]
    pub trade_type: TradeSide,
    pub timestamp: DateTime<Utc>,
    pub from_token: TokenSnapshot,
    pub to_token: TokenSnapshot,
    /// Stringified UI amount, "0" on failure
    pub from_amount: String,
    /// Stringified UI amount, "0" on failure
    pub to_amount: String,
    pub fee: f64,
    pub profit_loss: ProfitLoss,
    pub failure_reason: Option<String>,
    pub metadata: serde_json::Value,
    pub tx_reference: Option<TxReference>,
    pub strategy_assignment_id: String,
}

impl TransactionRecord {
    /// `OPEN` record for an executed (or simulated) swap
    pub fn success(
        side: TradeSide,
        from: &Token,
        to: &Token,
        tx_reference: TxReference,
        details: &SwapDetails,
        strategy_assignment_id: &str,
    ) -> Self {
        Self {
            side,
            status: RecordStatus::Open,
            trade_type: side,
            timestamp: Utc::now(),
            from_token: from.into(),
            to_token: to.into(),
            from_amount: format_amount(details.input_amount),
            to_amount: format_amount(details.output_amount),
            fee: 0.0,
            profit_loss: ProfitLoss::Unset,
            failure_reason: None,
            metadata: serde_json::json!({ "paper": tx_reference.is_paper() }),
            tx_reference: Some(tx_reference),
            strategy_assignment_id: strategy_assignment_id.to_string(),
        }
    }

    /// `FAILED` record with zeroed amounts
    pub fn failure(
        side: TradeSide,
        from: &Token,
        to: &Token,
        failure_reason: String,
        metadata: serde_json::Value,
        tx_reference: Option<TxReference>,
        strategy_assignment_id: &str,
    ) -> Self {
        Self {
            side,
            status: RecordStatus::Failed,
            trade_type: side,
            timestamp: Utc::now(),
            from_token: from.into(),
            to_token: to.into(),
            from_amount: "0".to_string(),
            to_amount: "0".to_string(),
            fee: 0.0,
            profit_loss: ProfitLoss::Unset,
            failure_reason: Some(failure_reason),
            metadata,
            tx_reference,
            strategy_assignment_id: strategy_assignment_id.to_string(),
        }
    }
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map_or_else(|| "0".to_string(), |a| a.to_string())
}

/// A record as returned by the store, with its assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub id: uuid::Uuid,
    #[serde(flatten)]
    pub record: TransactionRecord,
}
