//! Decision Pipeline Integration Tests
//!
//! Drives `DecisionBatchRunner` end to end through the public API:
//! 1. Paper trading never reaches the backend
//! 2. Live trades retry with exponential backoff and record once
//! 3. Failures stay isolated to their decision
//! 4. Outcomes land in the JSON-lines log
//!
//! All tests are deterministic (no network, virtual clock).

use std::sync::Arc;
use std::time::Duration;

use decision_executor::adapters::store::{InMemoryTransactionStore, JsonlTransactionStore};
use decision_executor::application::{
    DecisionBatchRunner, ExecutionContext, ExecutionResult, OutcomeRecorder, PipelineError,
    RetryRunner, SubmissionMode, SwapExecutor, TradeExecutionPipeline,
};
use decision_executor::domain::{
    ProfitLoss, RecordStatus, SwapDetails, Token, TokenPair, TradeDecision, TradeValidator,
    TxReference, ValidationPolicy, WSOL_MINT,
};
use decision_executor::ports::mocks::{CollectingEventSink, RecordingSleeper, ScriptedBackend};
use decision_executor::ports::{BackendError, EventSink, ExecutionEvent, TransactionStore};

// ============================================================================
// Test Fixtures
// ============================================================================

const ASSIGNMENT: &str = "assignment-7";

fn create_token(symbol: &str, trust_score: f64) -> Token {
    Token::new(format!("{}Mint1111111111111111111111111111111111", symbol), symbol, 6)
        .with_metrics(0.5, 5_000_000.0, 10_000_000.0)
        .with_trust_score(trust_score)
}

fn create_decision(symbol: &str, amount: f64) -> TradeDecision {
    let sol = Token::new(WSOL_MINT, "SOL", 9)
        .with_metrics(150.0, 1e9, 1e9)
        .with_trust_score(1.0);
    TradeDecision::open(format!("enter {}", symbol), amount, TokenPair::new(sol, create_token(symbol, 0.9)))
}

fn create_context(decisions: Vec<TradeDecision>, paper: bool) -> ExecutionContext {
    ExecutionContext {
        decisions,
        strategy_assignment_id: ASSIGNMENT.to_string(),
        is_paper_trading: paper,
    }
}

struct Harness<S> {
    backend: Arc<ScriptedBackend>,
    store: Arc<S>,
    sleeper: RecordingSleeper,
    events: CollectingEventSink,
    runner: DecisionBatchRunner<Arc<ScriptedBackend>, Arc<S>>,
}

fn harness_with<S: TransactionStore + 'static>(
    backend: ScriptedBackend,
    store: S,
    mode: SubmissionMode,
) -> Harness<S> {
    let backend = Arc::new(backend);
    let store = Arc::new(store);
    let sleeper = RecordingSleeper::new();
    let events = CollectingEventSink::new();
    let sink: Arc<dyn EventSink> = Arc::new(events.clone());

    let retry = RetryRunner::default().with_sleeper(Arc::new(sleeper.clone()));
    let executor = SwapExecutor::new(backend.clone(), retry)
        .with_mode(mode)
        .with_events(sink.clone());
    let pipeline = TradeExecutionPipeline::new(
        TradeValidator::new(ValidationPolicy::default()),
        executor,
        OutcomeRecorder::new(store.clone()),
    )
    .with_events(sink);

    Harness {
        backend,
        store,
        sleeper,
        events,
        runner: DecisionBatchRunner::new(pipeline),
    }
}

fn harness(backend: ScriptedBackend) -> Harness<InMemoryTransactionStore> {
    harness_with(backend, InMemoryTransactionStore::new(), SubmissionMode::Resubmit)
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}

// ============================================================================
// Paper Trading
// ============================================================================

mod paper_trading {
    use super::*;

    #[tokio::test]
    async fn test_paper_batch_never_touches_backend() {
        let h = harness(ScriptedBackend::new());
        let ctx = create_context(vec![create_decision("BONK", 1.0), create_decision("WIF", 2.0)], true);

        let results = h.runner.run(&ctx).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert!(results.iter().all(|r| r.tx_reference == Some(TxReference::Paper)));
        assert!(h.backend.submit_calls().is_empty());
        assert!(h.backend.confirm_calls().is_empty());
        assert!(h.backend.details_calls().is_empty());

        let records = h.store.records();
        assert_eq!(records.len(), 2);
        for saved in &records {
            assert_eq!(saved.record.status, RecordStatus::Open);
            assert_eq!(saved.record.profit_loss, ProfitLoss::Unset);
            assert_eq!(saved.record.strategy_assignment_id, ASSIGNMENT);
            assert_eq!(saved.record.metadata["paper"], true);
        }
        // 1 SOL at $150 into a $0.50 token
        assert_eq!(records[0].record.to_amount, "300");
    }

    #[tokio::test]
    async fn test_paper_mode_still_validates() {
        let h = harness(ScriptedBackend::new());
        let mut risky = create_decision("RUG", 1.0);
        risky.token_pair.to.trust_score = 0.05;

        let results = h.runner.run(&create_context(vec![risky], true)).await;

        assert!(!results[0].success);
        assert!(matches!(results[0].error, Some(PipelineError::Validation { .. })));
        assert_eq!(h.store.records()[0].record.status, RecordStatus::Failed);
    }
}

// ============================================================================
// Live Execution and Retry
// ============================================================================

mod live_execution {
    use super::*;

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let backend = ScriptedBackend::new().with_submit_results(vec![
            Err(BackendError::ApiError("502 Bad Gateway".into())),
            Ok("sig-recovered".into()),
        ]);
        let h = harness(backend);

        let results = h.runner.run(&create_context(vec![create_decision("BONK", 1.0)], false)).await;

        assert!(results[0].success);
        assert_eq!(
            results[0].tx_reference,
            Some(TxReference::Signature("sig-recovered".into()))
        );
        assert_eq!(h.backend.submit_calls().len(), 2);
        assert_eq!(h.sleeper.sleeps(), secs(&[1]));
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_uses_doubling_backoff() {
        let backend = ScriptedBackend::new().failing_for("BONK");
        let h = harness(backend);

        let results = h.runner.run(&create_context(vec![create_decision("BONK", 1.0)], false)).await;

        assert!(!results[0].success);
        assert!(results[0].tx_reference.is_none());
        assert_eq!(h.backend.submit_calls().len(), 4);
        assert_eq!(h.sleeper.sleeps(), secs(&[1, 2, 4]));

        let records = h.store.records();
        assert_eq!(records.len(), 1);
        let record = &records[0].record;
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.from_amount, "0");
        assert_eq!(record.metadata["attempts"], 4);
        assert!(record
            .failure_reason
            .as_deref()
            .unwrap()
            .starts_with("Swap submission failed after 4 attempts"));

        let attempt_events = h
            .events
            .events()
            .into_iter()
            .filter(|e| matches!(e, ExecutionEvent::SubmissionAttemptFailed { .. }))
            .count();
        assert_eq!(attempt_events, 4);
    }

    #[tokio::test]
    async fn test_never_confirmed_swaps_stay_traceable() {
        let backend = ScriptedBackend::new().with_confirm_results(vec![Ok(None); 4]);
        let h = harness(backend);

        let results = h.runner.run(&create_context(vec![create_decision("BONK", 1.0)], false)).await;

        assert!(!results[0].success);
        assert_eq!(h.backend.submit_calls().len(), 4);

        let record = &h.store.records()[0].record;
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.tx_reference, Some(TxReference::Signature("sig-4".into())));
        assert_eq!(
            record.metadata["submittedSignatures"],
            serde_json::json!(["sig-1", "sig-2", "sig-3", "sig-4"])
        );
    }

    #[tokio::test]
    async fn test_submit_once_retries_confirmation_only() {
        let backend = ScriptedBackend::new().with_confirm_results(vec![
            Err(BackendError::RpcError("node behind".into())),
            Ok(None),
        ]);
        let h = harness_with(backend, InMemoryTransactionStore::new(), SubmissionMode::SubmitOnce);

        let results = h.runner.run(&create_context(vec![create_decision("BONK", 1.0)], false)).await;

        assert!(results[0].success);
        assert_eq!(h.backend.submit_calls().len(), 1);
        assert_eq!(h.backend.confirm_calls(), vec!["sig-1"; 3]);
        assert_eq!(h.sleeper.sleeps(), secs(&[1, 2]));
    }

    #[tokio::test]
    async fn test_incomplete_swap_details_recorded_as_failure() {
        let backend = ScriptedBackend::new().with_swap_details(Some(SwapDetails {
            input_amount: Some(1.0),
            output_amount: None,
        }));
        let h = harness(backend);

        let results = h.runner.run(&create_context(vec![create_decision("BONK", 1.0)], false)).await;

        assert!(!results[0].success);
        assert_eq!(results[0].error.as_ref().unwrap().to_string(), "Invalid swap details");

        let record = &h.store.records()[0].record;
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.failure_reason.as_deref(), Some("Invalid swap details"));
        assert_eq!(record.tx_reference, Some(TxReference::Signature("sig-1".into())));
        // details lookup is never retried
        assert_eq!(h.backend.details_calls().len(), 1);
        assert_eq!(h.backend.submit_calls().len(), 1);
    }
}

// ============================================================================
// Batch Isolation
// ============================================================================

mod batch_isolation {
    use super::*;

    fn outcome(results: &[ExecutionResult]) -> Vec<bool> {
        results.iter().map(|r| r.success).collect()
    }

    #[tokio::test]
    async fn test_middle_failure_does_not_abort_batch() {
        let h = harness(ScriptedBackend::new().failing_for("WIF"));
        let ctx = create_context(
            vec![
                create_decision("BONK", 1.0),
                create_decision("WIF", 1.0),
                create_decision("POPCAT", 1.0),
            ],
            false,
        );

        let results = h.runner.run(&ctx).await;

        assert_eq!(outcome(&results), vec![true, false, true]);
        assert_eq!(h.store.len(), 3);
        assert_eq!(
            h.store.records().iter().map(|r| r.record.status).collect::<Vec<_>>(),
            vec![RecordStatus::Open, RecordStatus::Failed, RecordStatus::Open]
        );
    }

    #[tokio::test]
    async fn test_non_actionable_decisions_produce_nothing() {
        let h = harness(ScriptedBackend::new());
        let mut hold = create_decision("BONK", 1.0);
        hold.should_open = false;

        let results = h.runner.run(&create_context(vec![hold, create_decision("WIF", 1.0)], false)).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].decision.token_pair.to.symbol, "WIF");
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.backend.submit_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failures_are_isolated_and_distinct() {
        let store = InMemoryTransactionStore::new();
        store.fail_writes("database unavailable");
        let h = harness_with(ScriptedBackend::new(), store, SubmissionMode::Resubmit);

        let ctx = create_context(vec![create_decision("BONK", 1.0), create_decision("WIF", 1.0)], false);
        let results = h.runner.run(&ctx).await;

        assert_eq!(outcome(&results), vec![false, false]);
        for result in &results {
            let error = result.error.as_ref().unwrap();
            assert!(error.is_persistence());
            assert!(error.tx_reference().is_some());
        }
        // both swaps were still attempted
        assert_eq!(h.backend.submit_calls().len(), 2);
        assert_eq!(
            h.events
                .events()
                .iter()
                .filter(|e| matches!(e, ExecutionEvent::PersistenceFailed { .. }))
                .count(),
            2
        );
    }
}

// ============================================================================
// JSON-lines Store
// ============================================================================

mod jsonl_store {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_batch_outcomes_appended_to_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.jsonl");
        let h = harness_with(
            ScriptedBackend::new().failing_for("WIF"),
            JsonlTransactionStore::new(&path),
            SubmissionMode::Resubmit,
        );

        let ctx = create_context(vec![create_decision("BONK", 1.0), create_decision("WIF", 1.0)], false);
        h.runner.run(&ctx).await;

        let saved = h.store.load_all().await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].record.status, RecordStatus::Open);
        assert_eq!(saved[1].record.status, RecordStatus::Failed);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
