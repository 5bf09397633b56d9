//! Fixed-backoff retry execution for async operations.
//!
//! The policy is deliberately narrow: a fixed attempt count, a fixed delay
//! between attempts, and a caller-supplied predicate over the error type.
//! Errors the predicate rejects are surfaced immediately without sleeping.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Errors that can occur while configuring a retry policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError {
    /// The retry policy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Retry policy with a fixed attempt count and fixed backoff delay.
///
/// `max_attempts` counts the initial attempt: a policy with
/// `max_attempts == 2` runs the operation at most twice, sleeping once in
/// between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy that runs an operation up to `max_attempts` times
    /// with a fixed `backoff` delay between attempts.
    pub fn new(max_attempts: u32, backoff: Duration) -> Result<Self, RetryError> {
        if max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(Self { max_attempts, backoff })
    }

    /// Policy that retries exactly once after the given delay.
    pub fn once_after(backoff: Duration) -> Self {
        Self { max_attempts: 2, backoff }
    }

    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, backoff: Duration::ZERO }
    }

    /// Maximum number of attempts (including the first).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between attempts.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `operation`, retrying while `is_retryable` accepts the error and
    /// attempts remain. The final error is returned unchanged.
    pub async fn run<T, E, F, Fut, P>(&self, is_retryable: P, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && is_retryable(&error) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = self.backoff.as_millis() as u64,
                        error = %error,
                        "operation failed with retryable error; backing off"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Transient => write!(f, "transient"),
                Self::Fatal => write!(f, "fatal"),
            }
        }
    }

    fn is_transient(error: &TestError) -> bool {
        matches!(error, TestError::Transient)
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let result = RetryPolicy::new(0, Duration::ZERO);
        assert!(matches!(result, Err(RetryError::InvalidConfiguration { .. })));
    }

    #[tokio::test]
    async fn success_on_first_attempt_does_not_retry() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::once_after(Duration::ZERO);

        let result: Result<u32, TestError> = policy
            .run(is_transient, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_error_is_retried_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::once_after(Duration::ZERO);

        let result: Result<u32, TestError> = policy
            .run(is_transient, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(TestError::Transient)
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn attempts_are_exhausted_after_one_retry() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::once_after(Duration::ZERO);

        let result: Result<u32, TestError> = policy
            .run(is_transient, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            })
            .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_error_is_surfaced_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::once_after(Duration::from_secs(60));

        let result: Result<u32, TestError> = policy
            .run(is_transient, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Fatal) }
            })
            .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_retry_policy_runs_exactly_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::no_retry();

        let result: Result<u32, TestError> = policy
            .run(is_transient, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            })
            .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
