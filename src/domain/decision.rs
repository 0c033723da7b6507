use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::TokenPair;

/// Direction of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Instruction from the strategy layer to open or close a position
///
/// Both flags may be false, in which case the decision is not actionable
/// and never reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDecision {
    pub description: String,
    #[serde(default)]
    pub should_open: bool,
    #[serde(default)]
    pub should_close: bool,
    /// Amount of `token_pair.from` to sell, in UI units
    pub amount: f64,
    pub token_pair: TokenPair,
}

impl TradeDecision {
    pub fn open(description: impl Into<String>, amount: f64, token_pair: TokenPair) -> Self {
        Self {
            description: description.into(),
            should_open: true,
            should_close: false,
            amount,
            token_pair,
        }
    }

    pub fn close(description: impl Into<String>, amount: f64, token_pair: TokenPair) -> Self {
        Self {
            description: description.into(),
            should_open: false,
            should_close: true,
            amount,
            token_pair,
        }
    }

    /// Open or close requested
    pub fn is_actionable(&self) -> bool {
        self.should_open || self.should_close
    }

    /// Opening buys into the target token, anything else sells out of it
    pub fn side(&self) -> TradeSide {
        if self.should_open {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }

    /// Trade notional in USD, priced off the token being sold
    pub fn notional_usd(&self) -> f64 {
        self.amount * self.token_pair.from.price
    }
}

impl fmt::Display for TradeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.side(),
            self.amount,
            self.token_pair.label(),
            self.description
        )
    }
}
