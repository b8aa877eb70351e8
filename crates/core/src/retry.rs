//! Explicit retry policy for transient failures.
//!
//! Retry behavior is a value (attempt count, backoff, retryable predicate)
//! rather than constants buried at call sites, so callers can configure it
//! and tests can exercise it in isolation. The only production consumer is
//! document attachment, which retries when a just-staged file is not yet
//! visible to the store.

use std::future::Future;
use std::time::Duration;

/// A fixed-backoff retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Policy for document attachment after a transaction create:
    /// 3 attempts spaced 200 ms apart.
    pub const fn attachment_default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }

    /// Run `op` until it succeeds, the error is not retryable, or attempts
    /// are exhausted. Returns the last error on failure.
    pub async fn run<T, E, F, Fut, P>(&self, retryable: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !retryable(&err) || attempt == attempts {
                        return Err(err);
                    }
                    last_err = Some(err);
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
        // Unreachable: the loop always returns on its final attempt.
        Err(last_err.expect("retry loop exited without an error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn succeeds_first_try_without_retrying() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick(3)
            .run(|_| true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick(3)
            .run(|_| true, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("not yet")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick(3)
            .run(|_| true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("still missing") }
            })
            .await;
        assert_eq!(result, Err("still missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick(5)
            .run(
                |e| *e == "transient",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("fatal") }
                },
            )
            .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick(0)
            .run(|_| true, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope") }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn attachment_default_is_three_by_200ms() {
        let policy = RetryPolicy::attachment_default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(200));
    }
}
