//! Trade Validator
//!
//! Pure pre-trade checks. This is the only gate in front of an irreversible
//! swap, so every rejection carries a human readable reason that ends up as
//! the failure reason of the persisted record.
//!
//! Checks:
//! - Trade size against target liquidity and 24h volume
//! - Estimated slippage (constant-product price impact)
//! - Target token trust score
//! - Position size against available liquidity

use serde::{Deserialize, Serialize};

use super::decision::TradeDecision;

/// Default minimum trust score (0.0 - 1.0 scale)
pub const DEFAULT_MIN_TRUST_SCORE: f64 = 0.4;

/// Default minimum pool liquidity in USD
pub const DEFAULT_MIN_LIQUIDITY_USD: f64 = 1_000.0;

/// Default maximum trade notional as a fraction of liquidity (2%)
pub const DEFAULT_MAX_LIQUIDITY_FRACTION: f64 = 0.02;

/// Default maximum trade notional as a fraction of 24h volume (5%)
pub const DEFAULT_MAX_VOLUME_FRACTION: f64 = 0.05;

/// Default maximum estimated slippage (3%)
pub const DEFAULT_MAX_SLIPPAGE: f64 = 0.03;

/// Default maximum position as a fraction of liquidity (5%)
pub const DEFAULT_MAX_POSITION_LIQUIDITY_FRACTION: f64 = 0.05;

/// Accept/reject outcome of a validation check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub reason: Option<String>,
}

impl ValidationVerdict {
    pub fn accept() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }

    /// Chain another check, keeping the first rejection
    pub fn and_then(self, next: impl FnOnce() -> ValidationVerdict) -> Self {
        if self.is_valid {
            next()
        } else {
            self
        }
    }
}

/// Inputs to [`TradeValidator::validate_trade_parameters`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParameters {
    /// Trade notional in USD
    pub amount_usd: f64,
    /// Target token liquidity in USD
    pub token_liquidity_usd: f64,
    /// Target token 24h volume in USD
    pub token_daily_volume_usd: f64,
    /// Expected slippage as a fraction (0.01 = 1%)
    pub expected_slippage: f64,
    /// Target token trust score
    pub trust_score: f64,
}

impl TradeParameters {
    /// Derive parameters for a decision, targeting `token_pair.to`
    pub fn from_decision(decision: &TradeDecision) -> Self {
        let target = &decision.token_pair.to;
        let amount_usd = decision.notional_usd();
        Self {
            amount_usd,
            token_liquidity_usd: target.liquidity_usd,
            token_daily_volume_usd: target.volume_24h_usd,
            expected_slippage: estimate_slippage(amount_usd, target.liquidity_usd),
            trust_score: target.trust_score,
        }
    }
}

/// Constant-product price impact of trading `amount_usd` into `liquidity_usd`
pub fn estimate_slippage(amount_usd: f64, liquidity_usd: f64) -> f64 {
    if liquidity_usd <= 0.0 || !liquidity_usd.is_finite() {
        return 1.0;
    }
    amount_usd / (liquidity_usd + amount_usd)
}

/// Validation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub min_trust_score: f64,
    pub min_liquidity_usd: f64,
    pub max_liquidity_fraction: f64,
    pub max_volume_fraction: f64,
    pub max_slippage: f64,
    pub max_position_liquidity_fraction: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_trust_score: DEFAULT_MIN_TRUST_SCORE,
            min_liquidity_usd: DEFAULT_MIN_LIQUIDITY_USD,
            max_liquidity_fraction: DEFAULT_MAX_LIQUIDITY_FRACTION,
            max_volume_fraction: DEFAULT_MAX_VOLUME_FRACTION,
            max_slippage: DEFAULT_MAX_SLIPPAGE,
            max_position_liquidity_fraction: DEFAULT_MAX_POSITION_LIQUIDITY_FRACTION,
        }
    }
}

/// Stateless validator over a [`ValidationPolicy`]
#[derive(Debug, Clone, Default)]
pub struct TradeValidator {
    policy: ValidationPolicy,
}

impl TradeValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Reject trades disproportionate to the target's liquidity/volume,
    /// with excessive expected slippage, or on an untrusted token
    pub fn validate_trade_parameters(&self, params: &TradeParameters) -> ValidationVerdict {
        let policy = &self.policy;

        if !params.amount_usd.is_finite() || params.amount_usd <= 0.0 {
            return ValidationVerdict::reject(format!(
                "Trade amount must be positive, got ${:.2}",
                params.amount_usd
            ));
        }

        let metrics = [
            ("trust score", params.trust_score),
            ("liquidity", params.token_liquidity_usd),
            ("24h volume", params.token_daily_volume_usd),
            ("expected slippage", params.expected_slippage),
        ];
        if let Some((name, value)) = metrics.iter().find(|(_, v)| !v.is_finite()) {
            return ValidationVerdict::reject(format!("Invalid {}: {}", name, value));
        }

        if params.trust_score < policy.min_trust_score {
            return ValidationVerdict::reject(format!(
                "Trust score {:.2} below minimum {:.2}",
                params.trust_score, policy.min_trust_score
            ));
        }

        if params.token_liquidity_usd < policy.min_liquidity_usd {
            return ValidationVerdict::reject(format!(
                "Liquidity ${:.2} below minimum ${:.2}",
                params.token_liquidity_usd, policy.min_liquidity_usd
            ));
        }

        let max_by_liquidity = params.token_liquidity_usd * policy.max_liquidity_fraction;
        if params.amount_usd > max_by_liquidity {
            return ValidationVerdict::reject(format!(
                "Trade size ${:.2} exceeds {:.1}% of liquidity (${:.2})",
                params.amount_usd,
                policy.max_liquidity_fraction * 100.0,
                params.token_liquidity_usd
            ));
        }

        let max_by_volume = params.token_daily_volume_usd * policy.max_volume_fraction;
        if params.amount_usd > max_by_volume {
            return ValidationVerdict::reject(format!(
                "Trade size ${:.2} exceeds {:.1}% of 24h volume (${:.2})",
                params.amount_usd,
                policy.max_volume_fraction * 100.0,
                params.token_daily_volume_usd
            ));
        }

        if params.expected_slippage > policy.max_slippage {
            return ValidationVerdict::reject(format!(
                "Expected slippage {:.2}% exceeds maximum {:.2}%",
                params.expected_slippage * 100.0,
                policy.max_slippage * 100.0
            ));
        }

        ValidationVerdict::accept()
    }

    /// Guard against a single position exceeding a safe fraction of liquidity
    pub fn validate_position_size(&self, amount_usd: f64, token_liquidity_usd: f64) -> ValidationVerdict {
        if !amount_usd.is_finite() || !token_liquidity_usd.is_finite() {
            return ValidationVerdict::reject(format!(
                "Invalid position: ${} against liquidity ${}",
                amount_usd, token_liquidity_usd
            ));
        }
        let max_position = token_liquidity_usd * self.policy.max_position_liquidity_fraction;
        if amount_usd > max_position {
            return ValidationVerdict::reject(format!(
                "Position size ${:.2} exceeds {:.1}% of liquidity (${:.2})",
                amount_usd,
                self.policy.max_position_liquidity_fraction * 100.0,
                token_liquidity_usd
            ));
        }
        ValidationVerdict::accept()
    }

    /// Run every check for a decision; the first rejection wins
    pub fn validate_decision(&self, decision: &TradeDecision) -> ValidationVerdict {
        let params = TradeParameters::from_decision(decision);
        self.validate_trade_parameters(&params)
            .and_then(|| self.validate_position_size(params.amount_usd, params.token_liquidity_usd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{Token, TokenPair, WSOL_MINT};

    fn healthy_params() -> TradeParameters {
        TradeParameters {
            amount_usd: 150.0,
            token_liquidity_usd: 500_000.0,
            token_daily_volume_usd: 1_000_000.0,
            expected_slippage: estimate_slippage(150.0, 500_000.0),
            trust_score: 0.8,
        }
    }

    #[test]
    fn test_accepts_healthy_trade() {
        let validator = TradeValidator::default();
        let verdict = validator.validate_trade_parameters(&healthy_params());
        assert!(verdict.is_valid);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_rejects_low_trust_score() {
        let validator = TradeValidator::default();
        let params = TradeParameters {
            trust_score: 0.1,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason.as_deref(), Some("Trust score 0.10 below minimum 0.40"));

        let params = TradeParameters {
            trust_score: f64::NAN,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.reason.as_deref(), Some("Invalid trust score: NaN"));
    }

    #[test]
    fn test_rejects_non_finite_market_metrics() {
        let validator = TradeValidator::default();
        let cases = [
            TradeParameters { token_liquidity_usd: f64::NAN, ..healthy_params() },
            TradeParameters { token_daily_volume_usd: f64::NAN, ..healthy_params() },
            TradeParameters { token_daily_volume_usd: f64::INFINITY, ..healthy_params() },
            TradeParameters { expected_slippage: f64::NAN, ..healthy_params() },
        ];
        for params in cases {
            let verdict = validator.validate_trade_parameters(&params);
            assert!(!verdict.is_valid, "accepted {:?}", params);
            assert!(verdict.reason.unwrap().starts_with("Invalid "));
        }
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let validator = TradeValidator::default();
        for amount in [0.0, -5.0, f64::NAN] {
            let params = TradeParameters {
                amount_usd: amount,
                ..healthy_params()
            };
            assert!(!validator.validate_trade_parameters(&params).is_valid);
        }
    }

    #[test]
    fn test_rejects_thin_liquidity() {
        let validator = TradeValidator::default();
        let params = TradeParameters {
            token_liquidity_usd: 500.0,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(verdict.reason.unwrap().contains("Liquidity"));
    }

    #[test]
    fn test_rejects_oversized_against_liquidity() {
        let validator = TradeValidator::default();
        let params = TradeParameters {
            amount_usd: 20_000.0,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(!verdict.is_valid);
        assert!(verdict.reason.unwrap().contains("of liquidity"));
    }

    #[test]
    fn test_rejects_oversized_against_volume() {
        let validator = TradeValidator::default();
        let params = TradeParameters {
            amount_usd: 5_000.0,
            token_daily_volume_usd: 10_000.0,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(verdict.reason.unwrap().contains("24h volume"));
    }

    #[test]
    fn test_rejects_high_slippage() {
        let validator = TradeValidator::default();
        let params = TradeParameters {
            expected_slippage: 0.10,
            ..healthy_params()
        };
        let verdict = validator.validate_trade_parameters(&params);
        assert!(verdict.reason.unwrap().contains("slippage"));
    }

    #[test]
    fn test_position_size() {
        let validator = TradeValidator::default();
        assert!(validator.validate_position_size(4_000.0, 100_000.0).is_valid);

        let verdict = validator.validate_position_size(6_000.0, 100_000.0);
        assert!(!verdict.is_valid);
        assert!(verdict.reason.unwrap().starts_with("Position size"));

        assert!(!validator.validate_position_size(f64::NAN, 100_000.0).is_valid);
        assert!(!validator.validate_position_size(4_000.0, f64::NAN).is_valid);
    }

    #[test]
    fn test_slippage_estimate() {
        assert_eq!(estimate_slippage(100.0, 0.0), 1.0);
        assert!((estimate_slippage(1_000.0, 99_000.0) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_validate_decision_uses_target_token() {
        let pair = TokenPair::new(
            Token::new(WSOL_MINT, "SOL", 9).with_metrics(150.0, 1e9, 1e9).with_trust_score(1.0),
            Token::new("Mint111", "BONK", 5)
                .with_metrics(0.00002, 800_000.0, 2_000_000.0)
                .with_trust_score(0.2),
        );
        let decision = TradeDecision::open("entry", 1.0, pair);

        let verdict = TradeValidator::default().validate_decision(&decision);
        assert_eq!(verdict.reason.as_deref(), Some("Trust score 0.20 below minimum 0.40"));

        let lenient = ValidationPolicy {
            min_trust_score: 0.1,
            ..ValidationPolicy::default()
        };
        let verdict = TradeValidator::new(lenient).validate_decision(&decision);
        assert!(verdict.is_valid);
    }

    #[test]
    fn test_validate_decision_rejects_nan_snapshot() {
        let pair = TokenPair::new(
            Token::new(WSOL_MINT, "SOL", 9).with_metrics(150.0, 1e9, 1e9).with_trust_score(1.0),
            Token::new("Mint111", "BONK", 5)
                .with_metrics(0.00002, 800_000.0, 2_000_000.0)
                .with_trust_score(0.9),
        );
        let mut decision = TradeDecision::open("entry", 1.0, pair);
        assert!(TradeValidator::default().validate_decision(&decision).is_valid);

        decision.token_pair.to.trust_score = f64::NAN;
        assert!(!TradeValidator::default().validate_decision(&decision).is_valid);

        decision.token_pair.to.trust_score = 0.9;
        decision.token_pair.to.volume_24h_usd = f64::NAN;
        let verdict = TradeValidator::default().validate_decision(&decision);
        assert_eq!(verdict.reason.as_deref(), Some("Invalid 24h volume: NaN"));
    }

    #[test]
    fn test_policy_deserializes_partial() {
        let policy: ValidationPolicy = toml::from_str("min_trust_score = 0.7").unwrap();
        assert_eq!(policy.min_trust_score, 0.7);
        assert_eq!(policy.max_slippage, DEFAULT_MAX_SLIPPAGE);
    }
}
