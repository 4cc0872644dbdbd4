use std::time::Duration;

/// Default interval between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How long to sleep between two readiness checks.
///
/// The sleep index passed to [`delay_for`](Self::delay_for) is zero-based:
/// index 0 is the sleep after the first check.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// The same interval every time.
    Fixed(Duration),
    /// `step * (index + 1)`, capped at `max`.
    Linear {
        /// Growth per sleep.
        step: Duration,
        /// Upper bound on a single sleep.
        max: Duration,
    },
    /// `initial * factor^index`, capped at `max`.
    Exponential {
        /// First sleep.
        initial: Duration,
        /// Upper bound on a single sleep.
        max: Duration,
        /// Growth factor; values below 1.0 are treated as 1.0.
        factor: f64,
    },
}

impl RetryStrategy {
    /// Compute the sleep for the given zero-based sleep index.
    ///
    /// ```
    /// use std::time::Duration;
    /// use aci_poller::RetryStrategy;
    ///
    /// let fixed = RetryStrategy::Fixed(Duration::from_secs(1));
    /// assert_eq!(fixed.delay_for(0), Duration::from_secs(1));
    /// assert_eq!(fixed.delay_for(99), Duration::from_secs(1));
    /// ```
    pub fn delay_for(&self, index: u32) -> Duration {
        match self {
            Self::Fixed(interval) => *interval,
            Self::Linear { step, max } => step.saturating_mul(index.saturating_add(1)).min(*max),
            Self::Exponential {
                initial,
                max,
                factor,
            } => {
                // Indices beyond i32::MAX saturate the power anyway.
                let exponent = i32::try_from(index).unwrap_or(i32::MAX);
                let raw = initial.as_secs_f64() * factor.max(1.0).powi(exponent);
                if raw.is_finite() && raw < max.as_secs_f64() {
                    Duration::from_secs_f64(raw)
                } else {
                    *max
                }
            }
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_one_second() {
        assert_eq!(
            RetryStrategy::default(),
            RetryStrategy::Fixed(Duration::from_millis(1000))
        );
        for index in [0, 1, 7, 1000] {
            assert_eq!(RetryStrategy::default().delay_for(index), Duration::from_secs(1));
        }
    }

    #[test]
    fn linear_grows_then_caps() {
        let strategy = RetryStrategy::Linear {
            step: Duration::from_millis(500),
            max: Duration::from_secs(2),
        };
        assert_eq!(strategy.delay_for(0), Duration::from_millis(500));
        assert_eq!(strategy.delay_for(2), Duration::from_millis(1500));
        assert_eq!(strategy.delay_for(3), Duration::from_secs(2));
        assert_eq!(strategy.delay_for(u32::MAX), Duration::from_secs(2));
    }

    #[test]
    fn exponential_grows_then_caps() {
        let strategy = RetryStrategy::Exponential {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(3),
            factor: 2.0,
        };
        assert_eq!(strategy.delay_for(0), Duration::from_millis(250));
        assert_eq!(strategy.delay_for(1), Duration::from_millis(500));
        assert_eq!(strategy.delay_for(3), Duration::from_secs(2));
        assert_eq!(strategy.delay_for(4), Duration::from_secs(3));
        assert_eq!(strategy.delay_for(u32::MAX), Duration::from_secs(3));
    }

    #[test]
    fn exponential_factor_below_one_does_not_shrink() {
        let strategy = RetryStrategy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(10),
            factor: 0.5,
        };
        assert_eq!(strategy.delay_for(5), Duration::from_secs(1));
    }
}
