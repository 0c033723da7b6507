//! Jupiter Adapter
//!
//! Quote fetching and swap transaction building against the Jupiter
//! DEX aggregator.

mod client;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig, JupiterError, DEFAULT_JUPITER_API_URL};
pub use quote::{QuoteRequest, QuoteResponse};
pub use swap::{SwapRequest, SwapResponse};
