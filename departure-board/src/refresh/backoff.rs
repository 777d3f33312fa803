//! Startup retry policy.

use std::time::Duration;

/// Exponential backoff for the initial fetch.
///
/// Until every category has been fetched once, failed categories are
/// retried after `initial_delay`, doubling each time up to `max_delay`.
/// After `max_attempts` the board starts anyway and the regular slow cycle
/// keeps trying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupBackoff {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl StartupBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for StartupBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            max_attempts: 5,
        }
    }
}
