use serde_json::{json, Value};
use solana_client::{rpc_client::RpcClient, rpc_request::RpcRequest};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionConfirmationStatus;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// Cluster view of a submitted signature
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureState {
    pub slot: u64,
    /// processed / confirmed / finalized
    pub confirmation_status: Option<String>,
    /// On-chain execution error, if the transaction failed
    pub err: Option<String>,
}

impl SignatureState {
    /// Landed at confirmed commitment or better
    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmation_status.as_deref(), Some("confirmed") | Some("finalized"))
    }
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: String) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Send a signed versioned transaction without waiting for confirmation
    pub async fn send_versioned_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<String, SolanaClientError> {
        let tx = transaction.clone();
        let client = Arc::clone(&self.client);

        tokio::task::spawn_blocking(move || {
            client
                .send_transaction(&tx)
                .map(|sig| sig.to_string())
                .map_err(|e| SolanaClientError::TransactionError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    /// Current status of a signature; `None` if the cluster has not seen it
    pub async fn get_signature_status(
        &self,
        signature_str: &str,
    ) -> Result<Option<SignatureState>, SolanaClientError> {
        let signature = parse_signature(signature_str)?;

        let client = Arc::clone(&self.client);
        let statuses = tokio::task::spawn_blocking(move || {
            client
                .get_signature_statuses(&[signature])
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))??;

        Ok(statuses.value.into_iter().next().flatten().map(|status| SignatureState {
            slot: status.slot,
            confirmation_status: status.confirmation_status.map(|s| commitment_label(&s).to_string()),
            err: status.err.map(|e| e.to_string()),
        }))
    }

    /// Raw `getTransaction` JSON (json encoding, v0 aware); `None` if unknown
    pub async fn get_transaction_json(
        &self,
        signature_str: &str,
    ) -> Result<Option<Value>, SolanaClientError> {
        let signature = parse_signature(signature_str)?;
        let params = json!([
            signature.to_string(),
            {
                "encoding": "json",
                "commitment": "confirmed",
                "maxSupportedTransactionVersion": 0
            }
        ]);

        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .send::<Option<Value>>(RpcRequest::GetTransaction, params)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }
}

fn commitment_label(status: &TransactionConfirmationStatus) -> &'static str {
    match status {
        TransactionConfirmationStatus::Processed => "processed",
        TransactionConfirmationStatus::Confirmed => "confirmed",
        TransactionConfirmationStatus::Finalized => "finalized",
    }
}

fn parse_signature(signature_str: &str) -> Result<Signature, SolanaClientError> {
    Signature::from_str(signature_str).map_err(|e| SolanaClientError::InvalidSignature(e.to_string()))
}
