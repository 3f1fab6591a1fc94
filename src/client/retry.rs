//! Retry with exponential backoff for transient (network-class) failures.
//!
//! Only `TraktError::Network` is retried. HTTP rejections (401, 404, 429,
//! other 4xx/5xx) are well-formed answers and propagate on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::TraktError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    pub multiplier: u32,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            multiplier: 2,
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exp);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned as-is.
///
/// `op` receives the 1-based attempt number. Backoff sleeps suspend only the
/// calling task.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, TraktError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TraktError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("retry[{}]: succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "retry[{}]: attempt {}/{} failed ({}), retrying in {:?}",
                    label,
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        "retry[{}]: giving up after {} attempts: {}",
                        label,
                        attempt,
                        e
                    );
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            multiplier: 2,
            max_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_default_schedule() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.delay_for(1), Duration::from_secs(2));
        assert_eq!(p.delay_for(2), Duration::from_secs(4));
        assert_eq!(p.delay_for(3), Duration::from_secs(8));
        assert_eq!(p.delay_for(4), Duration::from_secs(10));
        assert_eq!(p.delay_for(30), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_network_errors_exhaust_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<(), _> = with_retry(&fast(), "test", |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(TraktError::network("connection reset"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(TraktError::Network { .. })));
    }

    #[tokio::test]
    async fn test_success_after_transient_failure_stops_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = with_retry(&fast(), "test", |attempt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                if attempt == 1 {
                    Err(TraktError::network("timeout"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_http_rejections_are_not_retried() {
        for err in [
            TraktError::authentication(),
            TraktError::not_found(),
            TraktError::rate_limited(),
            TraktError::api("HTTP 500: oops", Some(500)),
        ] {
            let calls = Arc::new(AtomicU32::new(0));
            let c = calls.clone();
            let expected = err.clone();
            let result: Result<(), _> = with_retry(&fast(), "test", |_| {
                let c = c.clone();
                let err = err.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(err)
                }
            })
            .await;

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(result, Err(expected));
        }
    }

    #[tokio::test]
    async fn test_none_policy_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let _: Result<(), _> = with_retry(&RetryPolicy::none(), "test", |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(TraktError::network("down"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
