//! Normcheck Retry Policy
//!
//! One reusable retry policy for every network call in the pipeline:
//! embedding requests, semantic index queries and upserts. Call sites pass a
//! predicate deciding which errors are transient; everything else fails
//! immediately.
//!
//! # Examples
//!
//! ```
//! use normcheck_retry::{Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(500), Backoff::Linear);
//! assert_eq!(policy.delay_before(2), Duration::from_millis(1000));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How the delay between attempts grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// `base * attempt` (attempt counted from 1)
    Linear,
    /// `base * 2^(attempt - 1)`, capped at 32x base
    Exponential,
}

/// A bounded retry policy with growing backoff
///
/// `max_attempts` counts the first call: a policy with `max_attempts = 5`
/// makes at most five calls and sleeps four times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub base_delay_ms: u64,

    /// Delay growth function
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay.as_millis() as u64,
            backoff,
        }
    }

    /// Delay to sleep after `failed_attempts` attempts have failed.
    pub fn delay_before(&self, failed_attempts: u32) -> Duration {
        let n = failed_attempts.max(1) as u64;
        let ms = match self.backoff {
            Backoff::Linear => self.base_delay_ms * n,
            Backoff::Exponential => {
                let shift = (n - 1).min(5) as u32;
                self.base_delay_ms * (1u64 << shift)
            }
        };
        Duration::from_millis(ms)
    }
}

impl Default for RetryPolicy {
    /// Five attempts with linearly growing backoff from 500 ms.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            backoff: Backoff::Linear,
        }
    }
}

/// Run `op` under `policy`, retrying errors for which `is_retryable` is true.
///
/// Returns the first success, the first non-retryable error, or the last
/// error once attempts are exhausted. Each failed attempt is logged with the
/// operation label.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts || !is_retryable(&err) {
                    return Err(err);
                }
                let delay = policy.delay_before(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    label, attempt, policy.max_attempts, err, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1), Backoff::Linear)
    }

    #[test]
    fn linear_backoff_grows_with_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500), Backoff::Linear);
        assert_eq!(policy.delay_before(1), Duration::from_millis(500));
        assert_eq!(policy.delay_before(3), Duration::from_millis(1500));
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Backoff::Exponential);
        assert_eq!(policy.delay_before(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before(3), Duration::from_millis(400));
        assert_eq!(policy.delay_before(20), Duration::from_millis(3200));
    }

    #[test]
    fn zero_attempts_clamps_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1), Backoff::Linear);
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(&fast_policy(3), "op", |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(&fast_policy(5), "op", |_| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(&fast_policy(5), "op", |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("still down".to_string()) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "still down");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            &fast_policy(5),
            "op",
            |e: &String| e != "fatal",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal".to_string()) }
            },
        )
        .await;
        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
