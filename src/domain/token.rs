//! Token types
//!
//! Token identity plus the market metrics the strategy layer attaches to
//! every decision. Metrics are snapshots taken when the decision was made.

use serde::{Deserialize, Serialize};

/// Wrapped SOL mint address
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// A tradeable SPL token with its market snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Mint address (base58)
    pub address: String,
    /// Ticker symbol for display
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
    /// Logo reference (URI), if known
    #[serde(default)]
    pub logo_uri: Option<String>,
    /// Price in USD
    #[serde(default)]
    pub price: f64,
    /// Pool liquidity in USD
    #[serde(default)]
    pub liquidity_usd: f64,
    /// 24h traded volume in USD
    #[serde(default)]
    pub volume_24h_usd: f64,
    /// Trust score, 0.0 (untrusted) to 1.0
    #[serde(default)]
    pub trust_score: f64,
}

impl Token {
    /// Create a token with no market metrics
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
            logo_uri: None,
            price: 0.0,
            liquidity_usd: 0.0,
            volume_24h_usd: 0.0,
            trust_score: 0.0,
        }
    }

    /// Set market metrics
    pub fn with_metrics(mut self, price: f64, liquidity_usd: f64, volume_24h_usd: f64) -> Self {
        self.price = price;
        self.liquidity_usd = liquidity_usd;
        self.volume_24h_usd = volume_24h_usd;
        self
    }

    pub fn with_trust_score(mut self, trust_score: f64) -> Self {
        self.trust_score = trust_score;
        self
    }

    /// Whether this is the wrapped SOL mint
    pub fn is_native_sol(&self) -> bool {
        self.address == WSOL_MINT
    }

    /// Convert a UI amount to base units (lamports for SOL)
    ///
    /// Returns `None` for negative, non-finite or overflowing amounts.
    pub fn to_base_units(&self, ui_amount: f64) -> Option<u64> {
        if !ui_amount.is_finite() || ui_amount < 0.0 {
            return None;
        }
        let scaled = (ui_amount * 10f64.powi(self.decimals as i32)).round();
        if scaled > u64::MAX as f64 {
            return None;
        }
        Some(scaled as u64)
    }

    /// Convert base units to a UI amount
    pub fn from_base_units(&self, base_units: u64) -> f64 {
        base_units as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// The two sides of a swap: sell `from`, receive `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub from: Token,
    pub to: Token,
}

impl TokenPair {
    pub fn new(from: Token, to: Token) -> Self {
        Self { from, to }
    }

    /// Display form, e.g. `SOL/BONK`
    pub fn label(&self) -> String {
        format!("{}/{}", self.from.symbol, self.to.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_unit_conversion() {
        let sol = Token::new(WSOL_MINT, "SOL", 9);
        assert_eq!(sol.to_base_units(1.5), Some(1_500_000_000));
        assert_eq!(sol.from_base_units(250_000_000), 0.25);

        let usdc = Token::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6);
        assert_eq!(usdc.to_base_units(12.345678), Some(12_345_678));
    }

    #[test]
    fn test_base_unit_conversion_rejects_bad_amounts() {
        let sol = Token::new(WSOL_MINT, "SOL", 9);
        assert_eq!(sol.to_base_units(-1.0), None);
        assert_eq!(sol.to_base_units(f64::NAN), None);
        assert_eq!(sol.to_base_units(f64::INFINITY), None);
        assert_eq!(sol.to_base_units(1e30), None);
    }

    #[test]
    fn test_token_deserializes_with_missing_metrics() {
        let json = r#"{"address":"Mint111","symbol":"BONK","decimals":5}"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.symbol, "BONK");
        assert_eq!(token.trust_score, 0.0);
        assert!(token.logo_uri.is_none());
        assert!(!token.is_native_sol());
    }

    #[test]
    fn test_pair_label() {
        let pair = TokenPair::new(
            Token::new(WSOL_MINT, "SOL", 9),
            Token::new("Mint111", "BONK", 5),
        );
        assert_eq!(pair.label(), "SOL/BONK");
    }
}
