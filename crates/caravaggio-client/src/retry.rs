//! Retry utilities with a fixed delay.
//!
//! The API enforces a hard request quota and answers `429 Too Many Requests`
//! until its window resets, so retries wait a constant delay between attempts.
//!
//! # Example
//!
//! ```rust,no_run
//! use caravaggio_client::retry::{with_retry_if, RetryPolicy};
//! use std::time::Duration;
//!
//! async fn example() -> Result<String, std::io::Error> {
//!     let policy = RetryPolicy {
//!         max_attempts: 3,
//!         retry_delay: Duration::from_millis(100),
//!     };
//!
//!     with_retry_if(
//!         &policy,
//!         || async { Ok("success".to_string()) },
//!         |err: &std::io::Error| err.kind() == std::io::ErrorKind::WouldBlock,
//!     )
//!     .await
//! }
//! ```

use std::time::Duration;
use tokio::time::sleep;

/// Default number of attempts for a throttled action.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Default delay between attempts of a throttled action.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay between two attempts
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }

    /// Apply per-call overrides on top of this policy.
    pub fn merge(&self, overrides: &RetryOverride) -> Self {
        Self {
            max_attempts: overrides.max_attempts.unwrap_or(self.max_attempts),
            retry_delay: overrides.retry_delay.unwrap_or(self.retry_delay),
        }
    }
}

/// Per-call retry settings. Unset fields fall back to the dispatcher policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOverride {
    /// Attempts for this call
    pub max_attempts: Option<u32>,

    /// Delay for this call
    pub retry_delay: Option<Duration>,
}

impl RetryOverride {
    /// Override the number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Override the delay between attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = Some(retry_delay);
        self
    }
}

/// Execute a function, retrying the errors accepted by `is_retryable`.
///
/// The function is called up to `max_attempts` times. Retryable errors wait
/// `retry_delay` before the next attempt; once attempts are exhausted the last
/// error is returned as is. Other errors are returned immediately.
///
/// A policy with `max_attempts == 0` still makes one attempt; callers that must
/// reject it do so before calling.
///
/// # Arguments
///
/// * `policy` - Retry configuration
/// * `f` - Function to execute (must be `FnMut` and return a `Future`)
/// * `is_retryable` - Predicate to determine if an error is retryable
pub async fn with_retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut f: F,
    mut is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    P: FnMut(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !is_retryable(&e) => {
                tracing::debug!(error = ?e, "Error is not retryable, returning immediately");
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                tracing::error!(
                    attempts = attempt,
                    error = ?e,
                    "All retry attempts exhausted"
                );
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = policy.retry_delay.as_millis(),
                    error = ?e,
                    "Attempt failed, retrying"
                );

                sleep(policy.retry_delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn assert_elapsed(start: tokio::time::Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(50),
            "expected ~{:?}, got {:?}",
            expected,
            elapsed
        );
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 12);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_merge_overrides() {
        let policy = RetryPolicy {
            max_attempts: 4,
            retry_delay: Duration::from_secs(2),
        };

        assert_eq!(policy.merge(&RetryOverride::default()), policy);

        let merged = policy.merge(&RetryOverride::default().with_max_attempts(9));
        assert_eq!(merged.max_attempts, 9);
        assert_eq!(merged.retry_delay, Duration::from_secs(2));

        let merged = policy.merge(&RetryOverride::default().with_retry_delay(Duration::ZERO));
        assert_eq!(merged.max_attempts, 4);
        assert_eq!(merged.retry_delay, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_try_without_delay() {
        let policy = RetryPolicy::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let result = with_retry_if(
            &policy,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(42)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_retries() {
        let policy = RetryPolicy {
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
        };
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let result = with_retry_if(
            &policy,
            || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err("not yet")
                    } else {
                        Ok(42)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_elapsed(start, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        };
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let result = with_retry_if(
            &policy,
            || {
                let counter = counter_clone.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(format!("throttled {}", n))
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Err("throttled 2".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_elapsed(start, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error() {
        let policy = RetryPolicy::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let result = with_retry_if(
            &policy,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>("permanent failure")
                }
            },
            |_| false,
        )
        .await;

        assert_eq!(result, Err("permanent failure"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
