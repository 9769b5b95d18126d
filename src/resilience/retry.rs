//! Rate-Limit Retry
//!
//! Bounded fixed-interval retry of remote calls that the provider rejected with the
//! rate-limit signal. The retry counter lives in each `execute` call, so one executor can be
//! shared by concurrent operations without them consuming each other's budget.

use std::future::Future;
use tokio::time::sleep;

use crate::error::RemoteError;
use crate::types::{RateLimitBehaviour, RateLimitPolicy};

/// Executes remote calls under a [`RateLimitPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RateLimitRetryExecutor {
    policy: RateLimitPolicy,
}

impl RateLimitRetryExecutor {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Run `attempt` until it succeeds, fails with anything but the rate-limit signal, or the
    /// retry budget is spent.
    ///
    /// Under [`RateLimitBehaviour::Retry`] a call that is always rate limited is attempted
    /// `max_retry_count + 2` times: the check gives up only once the retry count has exceeded
    /// the maximum.
    pub async fn execute<T, F, Fut>(
        &self,
        resource: &'static str,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut retry_count: u32 = 0;

        loop {
            match attempt().await {
                Ok(value) => {
                    if retry_count > 0 {
                        tracing::debug!(
                            resource,
                            operation,
                            retries = retry_count,
                            "Succeeded after rate-limit retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if error.is_rate_limited() => {
                    let Some(next) = self.next_retry_count(retry_count) else {
                        tracing::warn!(
                            resource,
                            operation,
                            attempts = retry_count.saturating_add(1),
                            behaviour = ?self.policy.behaviour,
                            "Rate limited, giving up"
                        );
                        return Err(error);
                    };

                    retry_count = next;
                    tracing::warn!(
                        resource,
                        operation,
                        attempt = retry_count,
                        max_retries = self.policy.max_retry_count,
                        delay_ms = self.policy.retry_interval.as_millis() as u64,
                        "Rate limited, retrying"
                    );
                    sleep(self.policy.retry_interval).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// The retry count after one more retry, or `None` once the budget is spent. The count
    /// saturates, so a `u32::MAX` budget keeps retrying.
    fn next_retry_count(&self, retry_count: u32) -> Option<u32> {
        match self.policy.behaviour {
            RateLimitBehaviour::Fail => None,
            RateLimitBehaviour::Retry if retry_count <= self.policy.max_retry_count => {
                Some(retry_count.saturating_add(1))
            }
            RateLimitBehaviour::Retry => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn rate_limited() -> RemoteError {
        RemoteError::RateLimited { retry_after: None }
    }

    fn executor(behaviour: RateLimitBehaviour, max_retry_count: u32) -> RateLimitRetryExecutor {
        RateLimitRetryExecutor::new(RateLimitPolicy {
            behaviour,
            max_retry_count,
            retry_interval: Duration::from_millis(1),
        })
    }

    #[tokio::test]
    async fn test_always_rate_limited_attempts_max_plus_two() {
        for max in [0_u32, 1, 5] {
            let attempts = Arc::new(AtomicU32::new(0));
            let counter = attempts.clone();

            let result: Result<(), _> = executor(RateLimitBehaviour::Retry, max)
                .execute("users", "get", || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Err(rate_limited()) }
                })
                .await;

            assert!(matches!(result, Err(RemoteError::RateLimited { .. })));
            assert_eq!(attempts.load(Ordering::SeqCst), max + 2);
        }
    }

    #[tokio::test]
    async fn test_fail_behaviour_single_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = executor(RateLimitBehaviour::Fail, 5)
            .execute("users", "get", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(rate_limited()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = executor(RateLimitBehaviour::Retry, 5)
            .execute("users", "get", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(RemoteError::Api {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Api { status: 500, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_rate_limit() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = executor(RateLimitBehaviour::Retry, 5)
            .execute("users", "get", || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(rate_limited())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retry_count_saturates_at_max_budget() {
        let unbounded = executor(RateLimitBehaviour::Retry, u32::MAX);
        assert_eq!(unbounded.next_retry_count(0), Some(1));
        assert_eq!(unbounded.next_retry_count(u32::MAX - 1), Some(u32::MAX));
        assert_eq!(unbounded.next_retry_count(u32::MAX), Some(u32::MAX));

        let bounded = executor(RateLimitBehaviour::Retry, 1);
        assert_eq!(bounded.next_retry_count(1), Some(2));
        assert_eq!(bounded.next_retry_count(2), None);
        assert_eq!(executor(RateLimitBehaviour::Fail, u32::MAX).next_retry_count(0), None);
    }

    #[tokio::test]
    async fn test_max_budget_recovers_after_rate_limit() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = executor(RateLimitBehaviour::Retry, u32::MAX)
            .execute("grants", "get_all", || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(rate_limited())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
