//! Sleep abstraction for retry timing.

use std::time::Duration;

use async_trait::async_trait;

/// A clock that puts the current task to sleep.
///
/// The lifecycle manager's retry loops pause through this trait rather than
/// calling the timer directly, so tests can substitute a recording clock and
/// verify retry pacing without real waits.
#[async_trait]
pub trait SimpleClock: Send + Sync {
    /// Sleeps for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl SimpleClock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
