use std::time::Duration;

use crate::retry::RetryStrategy;

/// Configuration for a [`ReadinessPoller`](crate::ReadinessPoller).
///
/// The default polls every second with no attempt limit and no timeout, so
/// a poll for a resource that never becomes ready runs until it is
/// cancelled. Bound it with [`with_max_attempts`](Self::with_max_attempts)
/// or [`with_timeout`](Self::with_timeout).
///
/// ```
/// use std::time::Duration;
/// use aci_poller::PollConfig;
///
/// let config = PollConfig::default();
/// assert!(!config.is_bounded());
///
/// let config = config.with_timeout(Duration::from_secs(600));
/// assert!(config.is_bounded());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollConfig {
    /// Sleep schedule between checks.
    pub strategy: RetryStrategy,
    /// Maximum number of checks, including the first.
    pub max_attempts: Option<u32>,
    /// Maximum wall-clock time for the whole poll.
    pub timeout: Option<Duration>,
}

impl PollConfig {
    /// Poll at a fixed interval, unbounded.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            strategy: RetryStrategy::Fixed(interval),
            ..Self::default()
        }
    }

    /// Replace the sleep schedule.
    #[must_use]
    pub fn with_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Stop after this many checks.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Stop once this much time has passed.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns `true` if either an attempt limit or a timeout is set.
    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.timeout.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_one_second() {
        let config = PollConfig::default();
        assert_eq!(config.strategy, RetryStrategy::Fixed(Duration::from_secs(1)));
        assert!(config.max_attempts.is_none());
        assert!(config.timeout.is_none());
        assert!(!config.is_bounded());
    }

    #[test]
    fn builder_sets_bounds() {
        let config = PollConfig::fixed(Duration::from_millis(200))
            .with_max_attempts(5)
            .with_timeout(Duration::from_secs(30));
        assert_eq!(
            config.strategy,
            RetryStrategy::Fixed(Duration::from_millis(200))
        );
        assert_eq!(config.max_attempts, Some(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.is_bounded());
    }
}
