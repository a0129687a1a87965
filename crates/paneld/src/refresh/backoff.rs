use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Retry parameters for one class of fallible operations.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Doubles the delay, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// Invokes `op` until it succeeds, the failure is not retryable, or the
/// attempt budget is exhausted; in the latter two cases the last failure is
/// returned to the caller. The delay between attempts doubles up to the
/// policy cap, with a little jitter on top.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;
    let mut delay = policy.initial_delay;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !retryable(&error) {
                    log::debug!("{label} failed with a non-retryable error: {error}");
                    return Err(error);
                }
                attempt += 1;
                if attempt >= policy.max_attempts {
                    log::error!("{label} failed after {attempt} attempts: {error}");
                    return Err(error);
                }
                log::warn!(
                    "{label} failed (attempt {attempt}/{}): {error}. Retrying in {delay:?}...",
                    policy.max_attempts
                );
                tokio::time::sleep(with_jitter(delay)).await;
                delay = policy.next_delay(delay);
            }
        }
    }
}

fn with_jitter(delay: Duration) -> Duration {
    delay + delay.mul_f64(rand::rng().random_range(0.0..0.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn delays_double_and_cap() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        };
        let mut delay = policy.initial_delay;
        let mut observed = vec![delay];
        for _ in 0..4 {
            delay = policy.next_delay(delay);
            observed.push(delay);
        }
        assert_eq!(
            observed,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
                Duration::from_secs(5),
            ]
        );
    }

    #[tokio::test]
    async fn retryable_failure_exhausts_the_attempt_budget() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), FetchError> = retry_with_backoff(
            &fast_policy(4),
            "test fetch",
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Timeout("no answer".into()))
            },
            FetchError::is_retryable,
        )
        .await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_failure_makes_exactly_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), FetchError> = retry_with_backoff(
            &fast_policy(5),
            "test fetch",
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Auth("bad credentials".into()))
            },
            FetchError::is_retryable,
        )
        .await;
        assert!(matches!(result, Err(FetchError::Auth(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn eventual_success_stops_retrying() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, FetchError> = retry_with_backoff(
            &fast_policy(5),
            "test fetch",
            || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError::Connection("refused".into()))
                } else {
                    Ok(n)
                }
            },
            FetchError::is_retryable,
        )
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
