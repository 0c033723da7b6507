use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
}

/// Holds the trading keypair and signs swap transactions with it
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a Solana CLI keypair file (JSON byte array)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read {}: {}", path.as_ref().display(), e)))?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self { keypair })
    }

    /// Throwaway keypair for paper runs and tests
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Sign an unsigned versioned transaction; the wallet must be its fee payer
    pub fn sign_versioned_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        let payer = transaction.message.static_account_keys().first().copied();
        if payer != Some(self.pubkey()) {
            return Err(WalletError::SigningError(format!(
                "fee payer {:?} is not wallet {}",
                payer.map(|p| p.to_string()),
                self.public_key()
            )));
        }

        VersionedTransaction::try_new(transaction.message, &[&self.keypair])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: self.keypair.insecure_clone(),
        }
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager").field("pubkey", &self.public_key()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{v0, VersionedMessage},
        system_instruction,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn unsigned_tx(payer: &Pubkey) -> VersionedTransaction {
        let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), 1_000);
        let message = v0::Message::try_compile(payer, &[ix], &[], Hash::default()).unwrap();
        VersionedTransaction {
            signatures: vec![Default::default()],
            message: VersionedMessage::V0(message),
        }
    }

    #[test]
    fn test_from_bytes() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = WalletManager::from_bytes(&wallet1.to_bytes()).unwrap();
        assert_eq!(wallet1.public_key(), wallet2.public_key());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let wallet1 = WalletManager::new_random();
        let json = serde_json::to_string(&wallet1.to_bytes()).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let wallet2 = WalletManager::from_file(temp_file.path()).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }

    #[test]
    fn test_invalid_json_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            WalletManager::from_file(temp_file.path()),
            Err(WalletError::LoadError(_))
        ));
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(WalletManager::from_bytes(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_sign_versioned_transaction() {
        let wallet = WalletManager::new_random();
        let signed = wallet.sign_versioned_transaction(unsigned_tx(&wallet.pubkey())).unwrap();

        assert_eq!(signed.signatures.len(), 1);
        assert!(signed.verify_with_results().iter().all(|ok| *ok));
    }

    #[test]
    fn test_sign_rejects_foreign_payer() {
        let wallet = WalletManager::new_random();
        let result = wallet.sign_versioned_transaction(unsigned_tx(&Pubkey::new_unique()));
        assert!(matches!(result, Err(WalletError::SigningError(_))));
    }

    #[test]
    fn test_clone_wallet() {
        let wallet1 = WalletManager::new_random();
        assert_eq!(wallet1.public_key(), wallet1.clone().public_key());
    }
}
