//! Shared retry policy for outbound calls.
//!
//! One parameterized loop shared by every HTTP call site (feeds, LLM,
//! webhook, token exchange). Backoff is linear in the attempt number unless
//! the operation supplies an explicit wait (e.g. a `Retry-After` header).

use std::future::Future;
use std::time::Duration;

/// Outcome of a single attempt, decided by the operation itself.
pub enum Attempt<T> {
    /// Success; stop and yield the value.
    Done(T),
    /// Transient failure; retry after `wait` if given, else after the
    /// policy's backoff for this attempt.
    Retry { wait: Option<Duration> },
    /// Permanent failure (e.g. HTTP 404); stop immediately, no retry.
    Fail,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Linear backoff: attempt 1 waits `base_delay`, attempt 2 waits twice
    /// that, and so on.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt.max(1)
    }

    /// Drive `op` until it succeeds, fails permanently, or attempts run out.
    /// The operation receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Option<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Attempt::Done(v) => return Some(v),
                Attempt::Fail => return None,
                Attempt::Retry { wait } => {
                    if attempt < self.max_attempts {
                        let d = wait.unwrap_or_else(|| self.delay_for(attempt));
                        tracing::debug!(attempt, wait_ms = d.as_millis() as u64, "retrying");
                        tokio::time::sleep(d).await;
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn exhaustion_uses_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let out: Option<()> = fast(5)
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Attempt::Retry { wait: None }
            })
            .await;
        assert!(out.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn permanent_failure_stops_immediately() {
        let calls = AtomicU32::new(0);
        let out: Option<()> = fast(5)
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Attempt::Fail
            })
            .await;
        assert!(out.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_midway() {
        let out = fast(5)
            .run(|attempt| async move {
                if attempt == 3 {
                    Attempt::Done(attempt)
                } else {
                    Attempt::Retry { wait: None }
                }
            })
            .await;
        assert_eq!(out, Some(3));
    }

    #[test]
    fn backoff_is_linear() {
        let p = RetryPolicy::new(3, Duration::from_secs(2));
        assert_eq!(p.delay_for(1), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(6));
    }
}
