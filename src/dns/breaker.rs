//! Per-run quick-fail breaker.
//!
//! Counts consecutive timeouts for one resolver within one run. Any other
//! outcome, including `NoRecord` and unexpected errors, clears the streak.

use crate::dns::types::ProbeResult;

/// Consecutive-timeout breaker for a single resolver run.
///
/// # Example
///
/// ```ignore
/// let mut breaker = QuickFailBreaker::new(3);
/// for result in results {
///     if breaker.record(&result) {
///         break;
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QuickFailBreaker {
    threshold: u32,
    consecutive_timeouts: u32,
}

impl QuickFailBreaker {
    /// Create a breaker that trips after `threshold` consecutive timeouts.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive_timeouts: 0,
        }
    }

    /// Feed one probe result into the breaker.
    ///
    /// Returns `true` if the breaker is tripped after this result.
    pub fn record(&mut self, result: &ProbeResult) -> bool {
        if result.is_timeout() {
            self.consecutive_timeouts += 1;
        } else {
            self.consecutive_timeouts = 0;
        }
        self.is_tripped()
    }

    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.consecutive_timeouts >= self.threshold
    }

    #[must_use]
    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::types::ProbeErrorKind;
    use std::time::Duration;

    fn timeout() -> ProbeResult {
        ProbeResult::failed(ProbeErrorKind::Timeout, "Timeout after 1 retries")
    }

    #[test]
    fn test_trips_at_threshold() {
        let mut breaker = QuickFailBreaker::new(3);
        assert!(!breaker.record(&timeout()));
        assert!(!breaker.record(&timeout()));
        assert!(breaker.record(&timeout()));
        assert!(breaker.is_tripped());
    }

    #[test]
    fn test_success_resets_streak() {
        let mut breaker = QuickFailBreaker::new(3);
        breaker.record(&timeout());
        breaker.record(&timeout());
        breaker.record(&ProbeResult::answered(Duration::from_millis(8)));
        assert_eq!(breaker.consecutive_timeouts(), 0);
        assert!(!breaker.record(&timeout()));
        assert!(!breaker.record(&timeout()));
        assert!(breaker.record(&timeout()));
    }

    #[test]
    fn test_non_timeout_failures_reset_streak() {
        let mut breaker = QuickFailBreaker::new(2);
        breaker.record(&timeout());
        breaker.record(&ProbeResult::failed(ProbeErrorKind::NoRecord, "NXDOMAIN"));
        assert_eq!(breaker.consecutive_timeouts(), 0);

        breaker.record(&timeout());
        breaker.record(&ProbeResult::failed(ProbeErrorKind::Unexpected, "refused"));
        assert_eq!(breaker.consecutive_timeouts(), 0);
        assert!(!breaker.is_tripped());
    }
}
