use serde::{Deserialize, Serialize};
use std::fmt;

use super::decision::TradeDecision;

/// Reference to the transaction a trade produced
///
/// Absence (`Option::None` at the use site) means no transaction was ever
/// produced, e.g. validation rejected the decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "signature", rename_all = "snake_case")]
pub enum TxReference {
    /// Simulated trade, nothing was submitted
    Paper,
    /// On-chain transaction signature (base58)
    Signature(String),
}

impl TxReference {
    /// Display string for paper trades
    pub const PAPER_PLACEHOLDER: &'static str = "paper-trade";

    pub fn signature(&self) -> Option<&str> {
        match self {
            TxReference::Paper => None,
            TxReference::Signature(sig) => Some(sig),
        }
    }

    pub fn is_paper(&self) -> bool {
        matches!(self, TxReference::Paper)
    }
}

impl fmt::Display for TxReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxReference::Paper => write!(f, "{}", Self::PAPER_PLACEHOLDER),
            TxReference::Signature(sig) => write!(f, "{}", sig),
        }
    }
}

/// Normalized amounts of a completed swap, in UI units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapDetails {
    pub input_amount: Option<f64>,
    pub output_amount: Option<f64>,
}

impl SwapDetails {
    pub fn new(input_amount: f64, output_amount: f64) -> Self {
        Self {
            input_amount: Some(input_amount),
            output_amount: Some(output_amount),
        }
    }

    /// Placeholder for a paper trade, priced off the decision's snapshot
    pub fn simulated(decision: &TradeDecision) -> Self {
        let from = &decision.token_pair.from;
        let to = &decision.token_pair.to;
        let output_amount = if from.price > 0.0 && to.price > 0.0 {
            Some(decision.amount * from.price / to.price)
        } else {
            None
        };
        Self {
            input_amount: Some(decision.amount),
            output_amount,
        }
    }

    /// Both amounts known. Live trades without this are invalid.
    pub fn is_complete(&self) -> bool {
        self.input_amount.is_some() && self.output_amount.is_some()
    }
}

/// On-chain status of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub signature: String,
    pub slot: u64,
    /// Commitment reached, e.g. "confirmed" or "finalized"
    #[serde(default)]
    pub confirmation_status: Option<String>,
}
