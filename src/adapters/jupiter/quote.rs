//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter swap quote API.

use serde::{Deserialize, Serialize};

/// Query parameters for `/quote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Amount in base units of the input mint
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl QuoteRequest {
    pub fn new(input_mint: impl Into<String>, output_mint: impl Into<String>, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint: input_mint.into(),
            output_mint: output_mint.into(),
            amount,
            slippage_bps,
        }
    }

    /// Query string pairs in the order Jupiter documents them
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
        ]
    }
}

/// Response from `/quote`
///
/// Only the fields this crate reads are typed; everything else is kept in
/// `extra` so the quote can be echoed back to `/swap` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    /// Minimum output after slippage
    pub other_amount_threshold: String,
    #[serde(default)]
    pub price_impact_pct: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl QuoteResponse {
    pub fn input_amount(&self) -> Option<u64> {
        self.in_amount.parse().ok()
    }

    pub fn output_amount(&self) -> Option<u64> {
        self.out_amount.parse().ok()
    }

    /// Price impact as a fraction (0.01 = 1%)
    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct.parse().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE_JSON: &str = r#"{
        "inputMint": "So11111111111111111111111111111111111111112",
        "outputMint": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
        "inAmount": "1000000000",
        "outAmount": "5000000000000",
        "otherAmountThreshold": "4975000000000",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "0.0012",
        "routePlan": [{"percent": 100, "swapInfo": {"label": "Raydium"}}],
        "contextSlot": 301234567
    }"#;

    #[test]
    fn test_query_pairs() {
        let req = QuoteRequest::new("SOL_MINT", "BONK_MINT", 1_500_000_000, 50);
        let pairs = req.query_pairs();
        assert_eq!(pairs[0], ("inputMint", "SOL_MINT".to_string()));
        assert_eq!(pairs[2], ("amount", "1500000000".to_string()));
        assert_eq!(pairs[3], ("slippageBps", "50".to_string()));
    }

    #[test]
    fn test_quote_response_parsing() {
        let quote: QuoteResponse = serde_json::from_str(QUOTE_JSON).unwrap();
        assert_eq!(quote.input_amount(), Some(1_000_000_000));
        assert_eq!(quote.output_amount(), Some(5_000_000_000_000));
        assert_eq!(quote.other_amount_threshold, "4975000000000");
        assert!((quote.price_impact() - 0.0012).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let quote: QuoteResponse = serde_json::from_str(QUOTE_JSON).unwrap();
        let echoed = serde_json::to_value(&quote).unwrap();
        assert_eq!(echoed["swapMode"], "ExactIn");
        assert_eq!(echoed["routePlan"][0]["swapInfo"]["label"], "Raydium");
        assert_eq!(echoed["contextSlot"], 301234567u64);
    }
}
