//! Engine settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for each query in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;

/// Default number of retries after a timed-out query.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default number of resolvers tested in parallel.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Default number of consecutive failed runs before a resolver is dropped.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Default number of consecutive timeouts before the remaining domains are skipped.
pub const DEFAULT_QUICK_FAIL_THRESHOLD: u32 = 3;

/// Default minimum success rate. Accepted but not consulted by any decision.
pub const DEFAULT_MIN_SUCCESS_RATE: f64 = 0.5;

/// Settings for a probing run.
///
/// Every field is optional in a config file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-attempt deadline and overall query lifetime, in seconds
    #[serde(rename = "timeout")]
    pub timeout_secs: f64,
    /// Retries after a timed-out attempt, per query
    pub max_retries: u32,
    /// Maximum number of resolvers probed concurrently
    pub max_workers: usize,
    /// Consecutive failed runs after which a resolver is no longer scheduled
    pub max_consecutive_failures: u32,
    /// Consecutive timeouts within a run after which a resolver's remaining
    /// domains are skipped
    pub quick_fail_threshold: u32,
    /// Reserved; no decision consults it
    pub min_success_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_workers: DEFAULT_MAX_WORKERS,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            quick_fail_threshold: DEFAULT_QUICK_FAIL_THRESHOLD,
            min_success_rate: DEFAULT_MIN_SUCCESS_RATE,
        }
    }
}

impl Config {
    /// Query timeout as a `Duration`.
    ///
    /// Only meaningful after [`Config::validate`] has accepted the value.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(Error::config(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            )));
        }
        if self.max_workers == 0 {
            return Err(Error::config("max_workers must be at least 1"));
        }
        if self.max_consecutive_failures == 0 {
            return Err(Error::config("max_consecutive_failures must be at least 1"));
        }
        if self.quick_fail_threshold == 0 {
            return Err(Error::config("quick_fail_threshold must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_success_rate) {
            return Err(Error::config(format!(
                "min_success_rate must be between 0 and 1, got {}",
                self.min_success_rate
            )));
        }
        Ok(())
    }
}
