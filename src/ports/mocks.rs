//! Test doubles for the ports
//!
//! Deterministic stand-ins that record every call, for unit tests and the
//! integration suite.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use crate::domain::{SwapDetails, Token, TransactionDetails};
use super::clock::Sleeper;
use super::events::{EventSink, ExecutionEvent};
use super::execution::{BackendError, TradingBackend};

/// Sleeper that returns immediately and records requested durations
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// All durations requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

/// Event sink that keeps every event
#[derive(Debug, Clone, Default)]
pub struct CollectingEventSink {
    events: Arc<Mutex<Vec<ExecutionEvent>>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: ExecutionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Recorded `submit_trade` call: (from symbol, amount, to symbol)
pub type SubmitCall = (String, f64, String);

/// Scriptable trading backend
///
/// Without a script every submission succeeds with a fresh signature,
/// confirms immediately and settles 1:1 at the submitted amount.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    submit_results: Mutex<VecDeque<Result<String, BackendError>>>,
    confirm_results: Mutex<VecDeque<Result<Option<TransactionDetails>, BackendError>>>,
    details_override: Mutex<Option<Option<SwapDetails>>>,
    failing_symbols: Mutex<HashSet<String>>,
    amounts: Mutex<HashMap<String, f64>>,
    submit_calls: Mutex<Vec<SubmitCall>>,
    confirm_calls: Mutex<Vec<String>>,
    details_calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results for successive `submit_trade` calls
    pub fn with_submit_results(self, results: Vec<Result<String, BackendError>>) -> Self {
        if let Ok(mut queue) = self.submit_results.lock() {
            queue.extend(results);
        }
        self
    }

    /// Queue results for successive `confirm` calls
    pub fn with_confirm_results(
        self,
        results: Vec<Result<Option<TransactionDetails>, BackendError>>,
    ) -> Self {
        if let Ok(mut queue) = self.confirm_results.lock() {
            queue.extend(results);
        }
        self
    }

    /// Return these details for every `swap_details` call
    pub fn with_swap_details(self, details: Option<SwapDetails>) -> Self {
        if let Ok(mut slot) = self.details_override.lock() {
            *slot = Some(details);
        }
        self
    }

    /// Every submission targeting this symbol fails
    pub fn failing_for(self, to_symbol: &str) -> Self {
        if let Ok(mut symbols) = self.failing_symbols.lock() {
            symbols.insert(to_symbol.to_string());
        }
        self
    }

    pub fn submit_calls(&self) -> Vec<SubmitCall> {
        self.submit_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn confirm_calls(&self) -> Vec<String> {
        self.confirm_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn details_calls(&self) -> Vec<String> {
        self.details_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn lock_err<E>(_: E) -> BackendError {
        BackendError::ApiError("scripted backend poisoned".to_string())
    }
}

#[async_trait]
impl TradingBackend for ScriptedBackend {
    async fn submit_trade(&self, from: &Token, amount: f64, to: &Token) -> Result<String, BackendError> {
        let call_index = {
            let mut calls = self.submit_calls.lock().map_err(Self::lock_err)?;
            calls.push((from.symbol.clone(), amount, to.symbol.clone()));
            calls.len()
        };

        if self.failing_symbols.lock().map_err(Self::lock_err)?.contains(&to.symbol) {
            return Err(BackendError::ApiError(format!("no route to {}", to.symbol)));
        }

        let scripted = self.submit_results.lock().map_err(Self::lock_err)?.pop_front();
        let signature = match scripted {
            Some(result) => result?,
            None => format!("sig-{}", call_index),
        };
        self.amounts.lock().map_err(Self::lock_err)?.insert(signature.clone(), amount);
        Ok(signature)
    }

    async fn confirm(&self, signature: &str) -> Result<Option<TransactionDetails>, BackendError> {
        self.confirm_calls.lock().map_err(Self::lock_err)?.push(signature.to_string());
        let scripted = self.confirm_results.lock().map_err(Self::lock_err)?.pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(Some(TransactionDetails {
                signature: signature.to_string(),
                slot: 1,
                confirmation_status: Some("confirmed".to_string()),
            })),
        }
    }

    async fn swap_details(
        &self,
        signature: &str,
        _from: &Token,
        _to: &Token,
    ) -> Result<Option<SwapDetails>, BackendError> {
        self.details_calls.lock().map_err(Self::lock_err)?.push(signature.to_string());
        if let Some(details) = *self.details_override.lock().map_err(Self::lock_err)? {
            return Ok(details);
        }
        let amount = self.amounts.lock().map_err(Self::lock_err)?.get(signature).copied();
        Ok(amount.map(|a| SwapDetails::new(a, a)))
    }
}
