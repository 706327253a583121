//! Remote resource access.
//!
//! This module provides the narrow read-only interface to the paged
//! collection endpoint: one request shape, "list items at offset O with
//! limit L", translated into a [`PageEnvelope`]. No filtering and no caching
//! happen here.

pub mod client;
pub mod error;

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::types::PageEnvelope;

pub use client::RemoteClient;
pub use error::TransportError;

/// Common interface for page sources.
///
/// [`RemoteClient`] is the HTTP implementation; tests substitute in-memory
/// sources.
pub trait PageSource: Send + Sync {
    /// Fetch one page of the unfiltered collection.
    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = std::result::Result<PageEnvelope, TransportError>> + Send;
}

impl<S: PageSource> PageSource for std::sync::Arc<S> {
    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = std::result::Result<PageEnvelope, TransportError>> + Send {
        (**self).fetch_page(offset, limit)
    }
}

/// Bounded retry policy for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `n * delay`
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.retry,
            delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Run `operation`, retrying transient failures up to `policy.max_retries`
/// times. Permanent failures and the last transient failure are returned
/// unchanged.
pub async fn execute_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> std::result::Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, TransportError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(attempt, max = policy.max_retries, "retrying after {err}");
                let backoff = policy.delay.saturating_mul(attempt);
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(100),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_failure() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = execute_with_retry(policy(1), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(TransportError::network("connection reset"))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_is_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: std::result::Result<(), _> = execute_with_retry(policy(2), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::with_status(
                "HTTP 502",
                StatusCode::BAD_GATEWAY,
            ))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status, Some(StatusCode::BAD_GATEWAY));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: std::result::Result<(), _> = execute_with_retry(policy(3), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::with_status("HTTP 404", StatusCode::NOT_FOUND))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = Config {
            retry: 4,
            retry_delay_ms: 10,
            ..Config::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.delay, Duration::from_millis(10));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }
}
