//! Back-off configuration for the listener accept loop.

use std::time::Duration;

/// Exponential back-off applied when `accept()` fails.
///
/// The first retry waits `initial_delay`; each further failure doubles the
/// wait up to `max_delay`. A successful accept resets it.
///
/// Defaults: 10 milliseconds initial, 1 second maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay used for the first retry after an `accept()` failure.
    pub initial_delay: Duration,
    /// Upper bound for the delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Clamp both delays to at least 1 millisecond and order them so that
    /// `initial_delay <= max_delay`.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use hl7_mllp::server::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::ZERO,
    ///     max_delay: Duration::from_millis(250),
    /// }
    /// .normalized();
    /// assert_eq!(cfg.initial_delay, Duration::from_millis(1));
    /// assert_eq!(cfg.max_delay, Duration::from_millis(250));
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let floor = Duration::from_millis(1);
        self.initial_delay = self.initial_delay.max(floor);
        self.max_delay = self.max_delay.max(floor);
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self
    }

    /// Delay to use after another failure following a wait of `current`.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}
