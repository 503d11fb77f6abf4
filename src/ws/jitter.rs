//! Full-jitter exponential backoff.
//!
//! Retry `k` (starting at 1) waits a uniformly random duration in
//! `[0, min((2^k - 1) * base, max))`. With the defaults this gives windows of
//! 1s, 3s, 7s, 15s and then a flat 30s.

#![expect(
    clippy::module_name_repetitions,
    reason = "The backoff type names the strategy it implements"
)]

use std::time::Duration;

use backoff::backoff::Backoff;
use rand::Rng;

/// Backoff schedule owning the reconnect attempt counter.
///
/// The counter starts at 1, advances by one each time [`Backoff::next_backoff`]
/// hands out a delay, and returns to 1 on [`Backoff::reset`].
#[derive(Debug, Clone)]
pub struct FullJitterBackoff {
    base: Duration,
    max: Duration,
    max_attempts: Option<u32>,
    attempt: u32,
}

impl FullJitterBackoff {
    #[must_use]
    pub const fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            max_attempts: None,
            attempt: 1,
        }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The attempt whose delay will be handed out next. Always `>= 1`.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Upper bound (exclusive) of the delay window for `attempt`.
    #[must_use]
    pub fn max_interval(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).map_or(u32::MAX, |p| p - 1);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// Draw a delay for `attempt` from `rng`.
    pub fn delay_with<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let window = u64::try_from(self.max_interval(attempt).as_millis()).unwrap_or(u64::MAX);
        if window == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.random_range(0..window))
    }
}

impl Default for FullJitterBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl Backoff for FullJitterBackoff {
    fn reset(&mut self) {
        self.attempt = 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max) = self.max_attempts
            && self.attempt > max
        {
            return None;
        }

        let delay = self.delay_with(self.attempt, &mut rand::rng());
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}
