//! Decision Batch Runner
//!
//! Filters a decision set to actionable decisions, drives each through the
//! pipeline and collects one result per decision, in decision order. A
//! failing decision never aborts the batch.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{TradeDecision, TxReference};
use crate::ports::{EventSink, ExecutionEvent, TradingBackend, TransactionStore};
use super::error::PipelineError;
use super::pipeline::TradeExecutionPipeline;

/// How many decisions may be in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One decision at a time
    #[default]
    Serial,
    /// Up to `max_in_flight` decisions concurrently; results keep decision order
    BoundedParallel { max_in_flight: usize },
}

impl ExecutionStrategy {
    fn max_in_flight(&self) -> usize {
        match self {
            ExecutionStrategy::Serial => 1,
            ExecutionStrategy::BoundedParallel { max_in_flight } => (*max_in_flight).max(1),
        }
    }
}

/// Everything a batch run needs from the caller
///
/// The chain connection and trading agent live inside the pipeline's
/// backend; the context only carries per-run inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    pub decisions: Vec<TradeDecision>,
    pub strategy_assignment_id: String,
    /// Never submit real swaps when set
    pub is_paper_trading: bool,
}

/// Outcome of one decision
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub decision: TradeDecision,
    /// Absent when the decision failed
    pub tx_reference: Option<TxReference>,
    pub success: bool,
    pub error: Option<PipelineError>,
}

impl ExecutionResult {
    fn succeeded(decision: TradeDecision, tx_reference: TxReference) -> Self {
        Self {
            decision,
            tx_reference: Some(tx_reference),
            success: true,
            error: None,
        }
    }

    fn failed(decision: TradeDecision, error: PipelineError) -> Self {
        Self {
            decision,
            tx_reference: None,
            success: false,
            error: Some(error),
        }
    }
}

/// Success/failure counts for a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub persistence_failures: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ExecutionResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            if result.success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                if result.error.as_ref().is_some_and(PipelineError::is_persistence) {
                    summary.persistence_failures += 1;
                }
            }
            summary
        })
    }
}

pub struct DecisionBatchRunner<B, S> {
    pipeline: TradeExecutionPipeline<B, S>,
    strategy: ExecutionStrategy,
}

impl<B: TradingBackend, S: TransactionStore> DecisionBatchRunner<B, S> {
    pub fn new(pipeline: TradeExecutionPipeline<B, S>) -> Self {
        Self {
            pipeline,
            strategy: ExecutionStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn events(&self) -> &Arc<dyn EventSink> {
        self.pipeline.events()
    }

    /// Execute every actionable decision and return their results in order
    pub async fn run(&self, context: &ExecutionContext) -> Vec<ExecutionResult> {
        let actionable = self.actionable(&context.decisions);

        self.events().emit(ExecutionEvent::BatchStarted {
            total: context.decisions.len(),
            actionable: actionable.len(),
            paper_trading: context.is_paper_trading,
        });

        let results: Vec<ExecutionResult> = stream::iter(actionable)
            .map(|decision| self.run_one(decision, context))
            .buffered(self.strategy.max_in_flight())
            .collect()
            .await;

        let summary = BatchSummary::from_results(&results);
        self.events().emit(ExecutionEvent::BatchCompleted {
            succeeded: summary.succeeded,
            failed: summary.failed,
        });
        results
    }

    fn actionable(&self, decisions: &[TradeDecision]) -> Vec<TradeDecision> {
        decisions
            .iter()
            .filter(|decision| {
                let keep = decision.is_actionable();
                if !keep {
                    self.events().emit(ExecutionEvent::DecisionSkipped {
                        description: decision.description.clone(),
                    });
                }
                keep
            })
            .cloned()
            .collect()
    }

    async fn run_one(&self, decision: TradeDecision, context: &ExecutionContext) -> ExecutionResult {
        match self
            .pipeline
            .execute(&decision, &context.strategy_assignment_id, context.is_paper_trading)
            .await
        {
            Ok(tx_reference) => ExecutionResult::succeeded(decision, tx_reference),
            Err(error) => ExecutionResult::failed(decision, error),
        }
    }
}
