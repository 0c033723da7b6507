//! Jupiter Swap Types
//!
//! `/swap` request and response, plus decoding of the returned
//! unsigned transaction.

use base64::Engine;
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::VersionedTransaction;

use super::client::JupiterError;
use super::quote::QuoteResponse;

/// Body for `/swap`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Wallet that signs and pays for the swap
    pub user_public_key: String,
    /// Quote exactly as returned by `/quote`
    pub quote_response: QuoteResponse,
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<u64>,
}

impl SwapRequest {
    pub fn new(user_public_key: impl Into<String>, quote_response: QuoteResponse) -> Self {
        Self {
            user_public_key: user_public_key.into(),
            quote_response,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: None,
        }
    }
}

/// Response from `/swap`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 bincode-serialized unsigned transaction
    pub swap_transaction: String,
    pub last_valid_block_height: u64,
    #[serde(default)]
    pub prioritization_fee_lamports: u64,
}

impl SwapResponse {
    /// Decode the unsigned versioned transaction
    pub fn decode_transaction(&self) -> Result<VersionedTransaction, JupiterError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.swap_transaction)
            .map_err(|e| JupiterError::InvalidTransaction(format!("base64: {}", e)))?;
        bincode::deserialize(&bytes)
            .map_err(|e| JupiterError::InvalidTransaction(format!("bincode: {}", e)))
    }
}
