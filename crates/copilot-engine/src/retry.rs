//! Exponential backoff with jitter for retryable Engine errors (spec §5, §7).

use std::time::Duration;

use rand::Rng;

use copilot_core::error::CoreError;

/// Backoff policy: base delay, multiplier, ceiling, and max attempts.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub ceiling: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { base: Duration::from_millis(200), ceiling: Duration::from_secs(30), max_attempts: 4 }
    }
}

impl BackoffPolicy {
    /// Delay before retry attempt `attempt` (0-indexed), honoring `retry_after` when present.
    fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(retry_after) = retry_after {
            return retry_after.min(self.ceiling);
        }
        let exponential = self.base.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exponential.min(self.ceiling);
        let jitter_ms = rand::thread_rng().gen_range(0..=capped.as_millis().max(1) as u64 / 4 + 1);
        capped.saturating_add(Duration::from_millis(jitter_ms))
    }
}

/// Run `operation` under `policy`, retrying while the returned error is
/// [`CoreError::retryable`] and attempts remain.
pub async fn with_retry<F, Fut, T>(policy: BackoffPolicy, mut operation: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CoreError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.retryable() && attempt + 1 < policy.max_attempts => {
                let retry_after = match &error {
                    CoreError::RateLimited { retry_after } => *retry_after,
                    _ => None,
                };
                tokio::time::sleep(policy.delay_for(attempt, retry_after)).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_retryable_errors_up_to_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = BackoffPolicy { base: Duration::from_millis(1), ceiling: Duration::from_millis(5), max_attempts: 3 };
        let result: Result<(), CoreError> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoreError::Network { message: "down".into() }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let calls = AtomicU32::new(0);
        let policy = BackoffPolicy::default();
        let result: Result<(), CoreError> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoreError::NotFound { message: "missing".into() }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_without_retry_on_first_ok() {
        let result = with_retry(BackoffPolicy::default(), || async { Ok::<_, CoreError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
