//! Domain Layer - Core types and pure logic for decision execution
//!
//! No I/O happens here. All external interactions go through the ports layer.
//!
//! - `token`: Tokens and their market snapshot
//! - `decision`: Trade decisions from the strategy layer
//! - `swap`: Swap details and transaction references
//! - `record`: Persisted transaction records
//! - `validator`: Pre-trade validation gate

pub mod token;
pub mod decision;
pub mod swap;
pub mod record;
pub mod validator;

pub use token::{Token, TokenPair, WSOL_MINT};
pub use decision::{TradeDecision, TradeSide};
pub use swap::{SwapDetails, TransactionDetails, TxReference};
pub use record::{PersistedRecord, ProfitLoss, RecordStatus, TokenSnapshot, TransactionRecord};
pub use validator::{TradeParameters, TradeValidator, ValidationPolicy, ValidationVerdict};
