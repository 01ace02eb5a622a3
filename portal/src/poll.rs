//! Fixed-interval status polling.
//!
//! DESIGN
//! ======
//! Each attempt waits one interval, then fetches. Polling stops when the
//! `done` predicate holds, when a fetch fails, or when the attempt cap (if
//! any) is reached. There is no backoff or jitter.
//!
//! Fetches never overlap: the next tick is only awaited after the previous
//! fetch returns, and a slow fetch delays the schedule rather than bunching
//! up missed ticks.
//!
//! A [`PollTask`] runs the loop in the background and aborts it when
//! dropped, so leaving a view cancels its polling.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::ClientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the condition holds or the task is cancelled.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    /// Payment confirmation: 30 attempts, 5 s apart.
    pub const PAYMENT: Self = Self { interval: Duration::from_secs(5), max_attempts: Some(30) };
    pub const EXPORT: Self = Self { interval: Duration::from_secs(3), max_attempts: None };
    pub const SUPPRESSION: Self = Self { interval: Duration::from_secs(5), max_attempts: None };

    #[must_use]
    pub const fn every(interval: Duration) -> Self {
        Self { interval, max_attempts: None }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Fetch repeatedly until `done` accepts a value, then return that value.
///
/// # Errors
///
/// Returns the first fetch error, or [`ClientError::TimedOut`] once the
/// attempt cap is reached.
pub async fn poll_until<T, F, Fut, D>(policy: PollPolicy, mut fetch: F, done: D) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
    D: Fn(&T) -> bool,
{
    let mut ticker = tokio::time::interval(policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut attempts: u32 = 0;
    loop {
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                warn!(attempts, "polling gave up");
                return Err(ClientError::TimedOut { attempts });
            }
        }
        ticker.tick().await;
        attempts += 1;

        let value = fetch().await?;
        if done(&value) {
            debug!(attempts, "poll condition met");
            return Ok(value);
        }
    }
}

// =============================================================================
// BACKGROUND TASK
// =============================================================================

/// Background poll loop, aborted on drop.
pub struct PollTask<T> {
    handle: Option<JoinHandle<Result<T, ClientError>>>,
}

impl<T: Send + 'static> PollTask<T> {
    pub fn spawn<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self { handle: Some(tokio::spawn(future)) }
    }

    /// Wait for the loop to finish.
    ///
    /// # Errors
    ///
    /// Returns the loop's error, or [`ClientError::Cancelled`] if it was aborted.
    pub async fn join(mut self) -> Result<T, ClientError> {
        let Some(handle) = self.handle.take() else {
            return Err(ClientError::Cancelled);
        };
        match handle.await {
            Ok(result) => result,
            Err(e) => {
                debug!(error = %e, "poll task ended without a result");
                Err(ClientError::Cancelled)
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl<T> Drop for PollTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
