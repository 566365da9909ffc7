//! Bounded retry with injected delay
//!
//! Retries run as an explicit loop: at most `max_retries + 1` attempts, with
//! the wait between attempts handed to a [`Delay`] so tests can run with no
//! real sleeping.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::error::InferenceError;

/// Retry policy for inference calls
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub delay_ms: u64,

    /// Multiplier applied per retry (1.0 keeps the delay constant)
    pub backoff_multiplier: f32,

    /// Add up to 25% jitter to each delay
    pub use_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay_ms: 1000,
            backoff_multiplier: 1.0,
            use_jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Policy with a different retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Policy that never waits between attempts
    #[must_use]
    pub fn immediate(mut self) -> Self {
        self.delay_ms = 0;
        self.use_jitter = false;
        self
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.delay_ms as f64 * f64::from(self.backoff_multiplier).powi(attempt as i32);

        let duration_ms = if self.use_jitter {
            let jitter = rand::random::<f64>() * 0.25;
            (base * (1.0 + jitter)) as u64
        } else {
            base as u64
        };

        Duration::from_millis(duration_ms)
    }
}

/// Waits between attempts
#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspend for `duration`
    async fn wait(&self, duration: Duration);
}

/// Real delay on the tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Delay that returns immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// A value together with the retries it took to obtain
#[derive(Clone, Debug, PartialEq)]
pub struct Retried<T> {
    /// The successful value
    pub value: T,
    /// Failed attempts before success
    pub retries: u32,
}

/// Exhausted or non-retryable failure
#[derive(Clone, Debug, PartialEq)]
pub struct RetryFailure {
    /// Error from the last attempt
    pub error: InferenceError,
    /// Attempts made in total
    pub attempts: u32,
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's budget is spent.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    delay: &dyn Delay,
    mut op: F,
) -> Result<Retried<T>, RetryFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, InferenceError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!(retries = attempt, "Inference call succeeded after retry");
                }
                return Ok(Retried {
                    value,
                    retries: attempt,
                });
            }
            Err(error) => {
                if !error.is_retryable() || attempt >= policy.max_retries {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt + 1,
                    });
                }

                let wait = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    kind = %error.kind(),
                    backoff_ms = wait.as_millis() as u64,
                    "Inference call failed, retrying"
                );
                delay.wait(wait).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_constant_delay_by_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(1000));
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy {
            delay_ms: 100,
            backoff_multiplier: 2.0,
            ..Default::default()
        };
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy {
            delay_ms: 400,
            use_jitter: true,
            ..Default::default()
        };
        for _ in 0..20 {
            let ms = policy.delay_for_attempt(0).as_millis();
            assert!((400..=500).contains(&ms));
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_two_failures() {
        let policy = RetryPolicy::default().with_max_retries(2);
        let calls = AtomicU32::new(0);

        let result = retry(&policy, &NoDelay, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(InferenceError::Connection("refused".into()))
                } else {
                    Ok("third")
                }
            }
        })
        .await;

        let retried = result.unwrap();
        assert_eq!(retried.value, "third");
        assert_eq!(retried.retries, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let policy = RetryPolicy::default().with_max_retries(1);
        let calls = AtomicU32::new(0);

        let result: Result<Retried<()>, _> = retry(&policy, &NoDelay, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(InferenceError::from_status(503, "busy")) }
        })
        .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let policy = RetryPolicy::default().with_max_retries(5);
        let calls = AtomicU32::new(0);

        let result: Result<Retried<()>, _> = retry(&policy, &NoDelay, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(InferenceError::NotFound("llama".into())) }
        })
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
