//! Retry utilities: attempt budgets and the generic retry wrapper.
//!
//! Uses `backon` with a constant (by default zero) delay. A policy is an
//! attempt budget plus a delay; what gets retried is decided by the caller's
//! predicate, so independent policies can be nested without sharing counters.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use serde::Deserialize;
use tracing::warn;

/// Attempt budget for one retry layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total physical attempts, including the first. 0 is treated as 1.
    pub attempts: usize,
    /// Pause between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::connection()
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Connectivity failures: 3 attempts, no delay.
    pub fn connection() -> Self {
        Self {
            attempts: 3,
            delay_ms: 0,
        }
    }

    /// Authorization failures: 2 attempts, no delay.
    pub fn authorization() -> Self {
        Self {
            attempts: 2,
            delay_ms: 0,
        }
    }

    /// Effective number of physical attempts.
    pub fn max_attempts(&self) -> usize {
        self.attempts.max(1)
    }

    /// backon counts retries, not attempts.
    pub fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_max_times(self.max_attempts() - 1)
    }
}

/// Budgets for both config server retry layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub connection: RetryPolicy,
    pub authorization: RetryPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            connection: RetryPolicy::connection(),
            authorization: RetryPolicy::authorization(),
        }
    }
}

/// Run `op` until it succeeds, fails with an error `when` rejects, or the
/// policy's attempts run out. The last error is returned unchanged.
pub async fn retry_when<T, E, F, Fut, P>(
    layer: &'static str,
    policy: &RetryPolicy,
    op: F,
    when: P,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
{
    op.retry(policy.backoff())
        .when(when)
        .notify(|err: &E, delay: Duration| {
            warn!(layer, error = %err, delay = ?delay, "Config server call failed, retrying");
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.connection, RetryPolicy::new(3, Duration::ZERO));
        assert_eq!(config.authorization, RetryPolicy::new(2, Duration::ZERO));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_retry_when_exhausts_budget() {
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;
        let result: Result<(), String> = retry_when(
            "test",
            &RetryPolicy::new(3, Duration::ZERO),
            move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_when_skips_rejected_errors() {
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;
        let result: Result<(), String> = retry_when(
            "test",
            &RetryPolicy::new(3, Duration::ZERO),
            move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            },
            |err: &String| err != "fatal",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_when_stops_on_success() {
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;
        let result: Result<usize, String> = retry_when(
            "test",
            &RetryPolicy::new(5, Duration::ZERO),
            move || async move {
                let n = calls_ref.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(n)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
