//! Bounded retry with exponential backoff
//!
//! Every failure is retried the same way; the runner knows nothing about
//! error kinds. Delays double per attempt from the base (1s, 2s, 4s, ...)
//! with no jitter.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::ports::{Sleeper, TokioSleeper};

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base backoff delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Initial attempt plus retries
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Retries exhausted; `last_error` is the final failure, unchanged
#[derive(Debug, Clone, Error, PartialEq)]
#[error("failed after {attempts} attempts: {last_error}")]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Observer for failed attempts: (attempt number, error, next delay)
pub type AttemptObserver<'a, E> = &'a (dyn Fn(u32, &E, Option<Duration>) + Send + Sync);

#[derive(Clone)]
pub struct RetryRunner {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RetryRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryRunner").field("policy", &self.policy).finish()
    }
}

impl Default for RetryRunner {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryRunner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper (virtual clock in tests)
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run `operation` until it succeeds or the retry ceiling is reached
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_observed(operation, &|_: u32, _: &E, _: Option<Duration>| {}).await
    }

    /// Like [`run`](Self::run), reporting each failed attempt to `observer`
    pub async fn run_observed<F, Fut, T, E>(
        &self,
        mut operation: F,
        observer: AttemptObserver<'_, E>,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.policy.max_attempts() {
                        observer(attempt, &error, None);
                        return Err(RetryError {
                            attempts: attempt,
                            last_error: error,
                        });
                    }

                    let delay = self.policy.delay_for(attempt - 1);
                    observer(attempt, &error, Some(delay));
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::RecordingSleeper;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn runner(sleeper: &RecordingSleeper) -> RetryRunner {
        RetryRunner::default().with_sleeper(Arc::new(sleeper.clone()))
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4_000));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[tokio::test]
    async fn test_success_first_try_never_sleeps() {
        let sleeper = RecordingSleeper::new();
        let result: Result<u32, RetryError<String>> = runner(&sleeper).run(|| async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_recovers_after_n_failures() {
        for failures in 0..3u32 {
            let sleeper = RecordingSleeper::new();
            let calls = AtomicU32::new(0);

            let result: Result<&str, RetryError<String>> = runner(&sleeper)
                .run(|| {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < failures {
                            Err(format!("fail {}", n))
                        } else {
                            Ok("done")
                        }
                    }
                })
                .await;

            assert_eq!(result, Ok("done"));
            assert_eq!(calls.load(Ordering::SeqCst), failures + 1);
            let expected: Vec<Duration> = (0..failures)
                .map(|k| Duration::from_millis(1_000 * 2u64.pow(k)))
                .collect();
            assert_eq!(sleeper.sleeps(), expected);
        }
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let sleeper = RecordingSleeper::new();
        let calls = AtomicU32::new(0);

        let result: Result<(), RetryError<String>> = runner(&sleeper)
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("fail {}", n)) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error, "fail 3");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            sleeper.sleeps(),
            vec![
                Duration::from_millis(1_000),
                Duration::from_millis(2_000),
                Duration::from_millis(4_000),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_retries() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(1),
        };
        let runner = RetryRunner::new(policy).with_sleeper(Arc::new(sleeper.clone()));

        let result: Result<(), RetryError<&str>> = runner.run(|| async { Err("nope") }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_observer_sees_every_failure() {
        let sleeper = RecordingSleeper::new();
        let seen = Mutex::new(Vec::new());

        let observer = |attempt: u32, err: &String, delay: Option<Duration>| {
            seen.lock().unwrap().push((attempt, err.clone(), delay));
        };
        let _: Result<(), RetryError<String>> = runner(&sleeper)
            .run_observed(|| async { Err("x".to_string()) }, &observer)
            .await;

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], (1, "x".to_string(), Some(Duration::from_millis(1_000))));
        assert_eq!(seen[3], (4, "x".to_string(), None));
    }

    #[test]
    fn test_retry_error_display() {
        let err = RetryError {
            attempts: 4,
            last_error: "timeout",
        };
        assert_eq!(err.to_string(), "failed after 4 attempts: timeout");
    }
}
