//! Lifecycle manager configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Pause between attempts in the detach retry loops (detach after an
    /// attach failure, detach, and release). Every attempt waits the same
    /// fixed pause; there is no backoff.
    pub retry_pause: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retry_pause: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_pause_is_one_second() {
        assert_eq!(LifecycleConfig::default().retry_pause, Duration::from_secs(1));
    }
}
