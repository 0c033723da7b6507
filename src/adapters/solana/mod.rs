pub mod rpc;
pub mod wallet;

pub use rpc::{SignatureState, SolanaClient, SolanaClientError};
pub use wallet::{WalletError, WalletManager};
