//! Shared retry policy for provider requests
//!
//! Implemented once and reused by every adapter; adapters never roll their
//! own backoff.

use crate::error::{ChorusError, ChorusResult};
use crate::llm::provider_types::ProviderKind;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_CAP_MS: u64 = 30_000;

/// Exponential backoff: `min(1000 * 2^attempt, 30000)` milliseconds.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let millis = BACKOFF_BASE_MS
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(BACKOFF_CAP_MS);
    Duration::from_millis(millis)
}

/// Invoke `operation` up to `max_retries + 1` times.
///
/// Non-retryable errors are raised immediately without further attempts.
/// A rate-limit error carrying a retry hint delays the next attempt by
/// exactly that many seconds; every other retryable failure sleeps the
/// capped exponential backoff. Exhaustion raises the last observed error.
///
/// The sleeps suspend only the current request's task and are aborted by
/// dropping the returned future.
pub async fn with_retry<T, F, Fut>(
    provider: ProviderKind,
    max_retries: u32,
    operation: F,
) -> ChorusResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ChorusResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(provider = %provider, attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if !error.is_retryable() {
                    warn!(provider = %provider, error = %error, "non-retryable error");
                    return Err(error);
                }

                if attempt < max_retries {
                    let delay = match error.retry_after() {
                        Some(secs) => Duration::from_secs(secs),
                        None => backoff_delay(attempt),
                    };
                    warn!(
                        provider = %provider,
                        attempt = attempt + 1,
                        max_attempts = max_retries + 1,
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "retrying after failure"
                    );
                    sleep(delay).await;
                } else {
                    warn!(
                        provider = %provider,
                        attempts = max_retries + 1,
                        error = %error,
                        "all retry attempts exhausted"
                    );
                }
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ChorusError::unknown(
            format!("all {} attempts failed without error details", max_retries + 1),
            provider.name(),
            false,
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[tokio::test]
    async fn non_retryable_error_makes_a_single_attempt() {
        let calls = counter();
        let result: ChorusResult<()> = with_retry(ProviderKind::OpenAi, 3, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ChorusError::auth("bad key", "openai"))
            }
        })
        .await;

        assert!(matches!(result, Err(ChorusError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_hint_overrides_backoff() {
        let calls = counter();
        let started = tokio::time::Instant::now();
        let result: ChorusResult<&str> = with_retry(ProviderKind::OpenAi, 2, || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ChorusError::rate_limit("slow down", "openai", Some(60)))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two sleeps of exactly the hinted 60 seconds, not the backoff curve
        assert_eq!(started.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_follow_exponential_backoff() {
        let calls = counter();
        let started = tokio::time::Instant::now();
        let result: ChorusResult<()> = with_retry(ProviderKind::Anthropic, 2, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ChorusError::server("unavailable", "anthropic", Some(503)))
            }
        })
        .await;

        assert!(matches!(result, Err(ChorusError::Server { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn exhaustion_surfaces_the_last_error() {
        let calls = counter();
        let result: ChorusResult<()> = with_retry(ProviderKind::Google, 0, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ChorusError::rate_limit("slow down", "google", Some(60)))
            }
        })
        .await;

        // max_retries = 0 means one attempt and no sleeping
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().retry_after(), Some(60));
    }

    #[test]
    fn backoff_is_capped_at_thirty_seconds() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(16));
        assert_eq!(backoff_delay(10), Duration::from_secs(30));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(30));
    }
}
