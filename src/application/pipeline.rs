//! Trade Execution Pipeline
//!
//! validate -> (paper | submit+confirm) -> swap details -> record
//!
//! Every decision that enters `execute` leaves exactly one record behind,
//! whichever stage it stopped at. Failures are recorded first and then
//! returned to the caller.

use std::sync::Arc;

use crate::domain::{RecordStatus, SwapDetails, TradeDecision, TradeValidator, TxReference};
use crate::ports::{
    EventSink, ExecutionEvent, NoopEventSink, StoreError, TradingBackend, TransactionStore,
};
use super::error::PipelineError;
use super::recorder::OutcomeRecorder;
use super::swap_executor::SwapExecutor;

pub struct TradeExecutionPipeline<B, S> {
    validator: TradeValidator,
    executor: SwapExecutor<B>,
    recorder: OutcomeRecorder<S>,
    events: Arc<dyn EventSink>,
}

impl<B: TradingBackend, S: TransactionStore> TradeExecutionPipeline<B, S> {
    pub fn new(validator: TradeValidator, executor: SwapExecutor<B>, recorder: OutcomeRecorder<S>) -> Self {
        Self {
            validator,
            executor,
            recorder,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Execute one decision and record its outcome
    ///
    /// Paper trading never calls the backend and yields `TxReference::Paper`.
    pub async fn execute(
        &self,
        decision: &TradeDecision,
        strategy_assignment_id: &str,
        paper_trading: bool,
    ) -> Result<TxReference, PipelineError> {
        let side = decision.side();
        let tokens = &decision.token_pair;

        match self.attempt(decision, paper_trading).await {
            Ok((tx_reference, details)) => {
                let saved = self
                    .recorder
                    .record_success(side, tokens, tx_reference.clone(), &details, strategy_assignment_id)
                    .await
                    .map_err(|source| {
                        self.persistence_failed(
                            decision,
                            RecordStatus::Open,
                            Some(tx_reference.clone()),
                            None,
                            source,
                        )
                    })?;

                self.events.emit(ExecutionEvent::OutcomeRecorded {
                    record_id: saved.id,
                    status: saved.record.status,
                    tx_reference: saved.record.tx_reference,
                });
                Ok(tx_reference)
            }
            Err(error) => {
                self.events.emit(ExecutionEvent::DecisionFailed {
                    pair: tokens.label(),
                    stage: error.stage(),
                    error: error.to_string(),
                });

                match self
                    .recorder
                    .record_failure(side, tokens, &error, strategy_assignment_id)
                    .await
                {
                    Ok(saved) => {
                        self.events.emit(ExecutionEvent::OutcomeRecorded {
                            record_id: saved.id,
                            status: saved.record.status,
                            tx_reference: saved.record.tx_reference,
                        });
                        Err(error)
                    }
                    Err(source) => Err(self.persistence_failed(
                        decision,
                        RecordStatus::Failed,
                        error.tx_reference(),
                        Some(error),
                        source,
                    )),
                }
            }
        }
    }

    async fn attempt(
        &self,
        decision: &TradeDecision,
        paper_trading: bool,
    ) -> Result<(TxReference, SwapDetails), PipelineError> {
        let tokens = &decision.token_pair;

        let verdict = self.validator.validate_decision(decision);
        if !verdict.is_valid {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "Trade rejected by validator".to_string());
            self.events.emit(ExecutionEvent::ValidationRejected {
                pair: tokens.label(),
                reason: reason.clone(),
            });
            return Err(PipelineError::Validation { reason });
        }

        if paper_trading {
            self.events.emit(ExecutionEvent::PaperTradeSimulated {
                pair: tokens.label(),
                side: decision.side(),
                amount: decision.amount,
            });
            return Ok((TxReference::Paper, SwapDetails::simulated(decision)));
        }

        let swap = self
            .executor
            .execute_swap(&tokens.from, decision.amount, &tokens.to)
            .await?;
        let details = self
            .executor
            .fetch_swap_details(&swap.signature, &tokens.from, &tokens.to)
            .await?;

        Ok((TxReference::Signature(swap.signature), details))
    }

    fn persistence_failed(
        &self,
        decision: &TradeDecision,
        status: RecordStatus,
        tx_reference: Option<TxReference>,
        trade_error: Option<PipelineError>,
        source: StoreError,
    ) -> PipelineError {
        self.events.emit(ExecutionEvent::PersistenceFailed {
            pair: decision.token_pair.label(),
            tx_reference: tx_reference.clone(),
            error: source.to_string(),
        });
        PipelineError::Persistence {
            status,
            tx_reference,
            trade_error: trade_error.map(Box::new),
            source,
        }
    }
}
