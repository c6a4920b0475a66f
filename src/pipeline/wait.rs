//! Strategies for giving the remote workflow time to run.

use crate::error::{Result, WorkflowError};
use std::future::Future;
use std::time::Duration;

/// How the pipeline waits between pushing a tag and pulling the branch back
pub trait WaitStrategy {
    /// Wait until the strategy considers the remote side ready
    fn wait(&self) -> impl Future<Output = Result<()>>;

    /// Short description for console output
    fn describe(&self) -> String;
}

/// Sleep for a fixed duration
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    duration: Duration,
}

impl FixedDelay {
    /// Delay of `duration`
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Delay of `secs` seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl WaitStrategy for FixedDelay {
    async fn wait(&self) -> Result<()> {
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "Waiting {}s for the remote workflow to start",
            self.duration.as_secs()
        )
    }
}

/// Do not wait at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

impl WaitStrategy for NoWait {
    async fn wait(&self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "Not waiting for the remote workflow".to_string()
    }
}

/// Poll a completion check at a fixed interval
pub struct PollUntil<F> {
    check: F,
    interval: Duration,
    max_attempts: u32,
}

impl<F, Fut> PollUntil<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    /// Poll `check` up to `max_attempts` times, sleeping `interval` in between
    pub fn new(check: F, interval: Duration, max_attempts: u32) -> Self {
        Self {
            check,
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl<F, Fut> WaitStrategy for PollUntil<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    async fn wait(&self) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            if (self.check)().await? {
                log::debug!("Remote workflow ready after {} check(s)", attempt);
                return Ok(());
            }
            if attempt < self.max_attempts && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
        }
        Err(WorkflowError::PollExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }

    fn describe(&self) -> String {
        format!(
            "Polling the remote workflow every {}s (up to {} checks)",
            self.interval.as_secs(),
            self.max_attempts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let start = tokio::time::Instant::now();
        FixedDelay::from_secs(15).wait().await.expect("wait");
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_no_wait_returns_immediately() {
        NoWait.wait().await.expect("wait");
    }

    #[tokio::test]
    async fn test_poll_until_completes() {
        let calls = AtomicU32::new(0);
        let strategy = PollUntil::new(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(n >= 3) }
            },
            Duration::ZERO,
            5,
        );
        strategy.wait().await.expect("completes");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_exhausts() {
        let strategy = PollUntil::new(|| async { Ok(false) }, Duration::ZERO, 2);
        let err = strategy.wait().await.expect_err("never completes");
        assert!(err.to_string().contains("2 check(s)"));
    }
}
