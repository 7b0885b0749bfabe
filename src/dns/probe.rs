//! Probe executor.
//!
//! Issues one classified, retried DNS query for one (resolver, domain) pair.
//! Failures never escape as `Err`; every outcome is a [`ProbeResult`].

use crate::config::Config;
use crate::dns::lookup::{Lookup, LookupError};
use crate::dns::types::{ProbeErrorKind, ProbeResult};
use tokio::time::Instant;

/// Probe `domain` against `resolver`, retrying timeouts up to
/// `config.max_retries` times.
///
/// Only the successful attempt is timed; elapsed time of earlier timed-out
/// attempts is not accumulated. `NoRecord` and unexpected failures return
/// after the first attempt.
pub async fn probe<L: Lookup>(
    lookup: &L,
    resolver: &str,
    domain: &str,
    config: &Config,
) -> ProbeResult {
    let timeout = config.timeout();
    let mut retries_left = config.max_retries;

    loop {
        let start = Instant::now();
        match lookup.lookup(resolver, domain, timeout).await {
            Ok(()) => return ProbeResult::answered(start.elapsed()),
            Err(LookupError::NoRecord(message)) => {
                return ProbeResult::failed(ProbeErrorKind::NoRecord, message);
            }
            Err(LookupError::Timeout) if retries_left > 0 => {
                retries_left -= 1;
                tracing::debug!(resolver, domain, retries_left, "query timed out, retrying");
            }
            Err(LookupError::Timeout) => {
                return ProbeResult::failed(
                    ProbeErrorKind::Timeout,
                    format!("Timeout after {} retries", config.max_retries),
                );
            }
            Err(LookupError::Other(message)) => {
                let message = format!("Error testing {resolver} with {domain}: {message}");
                tracing::error!(resolver, domain, message = %message, "unexpected probe error");
                return ProbeResult::failed(ProbeErrorKind::Unexpected, message);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted lookup shared by the probe, task and scheduler tests.

    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// One scripted attempt outcome.
    #[derive(Debug, Clone)]
    pub enum Step {
        /// Answer after the given delay.
        Answer(Duration),
        NoRecord,
        Timeout,
        Fail(&'static str),
    }

    /// A [`Lookup`] that replays scripted outcomes per (resolver, domain).
    ///
    /// Unscripted pairs answer immediately.
    #[derive(Default)]
    pub struct ScriptedLookup {
        script: Mutex<HashMap<(String, String), VecDeque<Step>>>,
        default: Option<Step>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedLookup {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use `step` for every pair without a script.
        pub fn with_default(step: Step) -> Self {
            Self {
                default: Some(step),
                ..Self::default()
            }
        }

        pub fn script(&self, resolver: &str, domain: &str, steps: impl IntoIterator<Item = Step>) {
            self.script
                .lock()
                .unwrap()
                .entry((resolver.to_string(), domain.to_string()))
                .or_default()
                .extend(steps);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Highest number of lookups observed running at the same time.
        pub fn peak_in_flight(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn next_step(&self, resolver: &str, domain: &str) -> Step {
            let mut script = self.script.lock().unwrap();
            script
                .get_mut(&(resolver.to_string(), domain.to_string()))
                .and_then(VecDeque::pop_front)
                .or_else(|| self.default.clone())
                .unwrap_or(Step::Answer(Duration::ZERO))
        }
    }

    impl Lookup for ScriptedLookup {
        async fn lookup(
            &self,
            resolver: &str,
            domain: &str,
            _timeout: Duration,
        ) -> Result<(), LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.next_step(resolver, domain) {
                Step::Answer(delay) => {
                    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    self.peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
                Step::NoRecord => Err(LookupError::NoRecord(format!(
                    "no record found for {domain}"
                ))),
                Step::Timeout => Err(LookupError::Timeout),
                Step::Fail(msg) => Err(LookupError::Other(msg.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedLookup, Step};
    use super::*;
    use std::time::Duration;

    fn config(max_retries: u32) -> Config {
        Config {
            max_retries,
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_times_only_final_attempt() {
        let lookup = ScriptedLookup::new();
        lookup.script(
            "1.1.1.1",
            "example.com",
            [Step::Timeout, Step::Answer(Duration::from_millis(25))],
        );

        let result = probe(&lookup, "1.1.1.1", "example.com", &config(1)).await;
        assert_eq!(result.response_time(), Some(Duration::from_millis(25)));
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_after_retries_exhausted() {
        let lookup = ScriptedLookup::with_default(Step::Timeout);

        let result = probe(&lookup, "1.1.1.1", "example.com", &config(2)).await;
        let err = result.error().unwrap();
        assert_eq!(err.kind, ProbeErrorKind::Timeout);
        assert_eq!(err.message, "Timeout after 2 retries");
        assert_eq!(lookup.calls(), 3);
    }

    #[tokio::test]
    async fn test_no_retries_configured() {
        let lookup = ScriptedLookup::with_default(Step::Timeout);

        let result = probe(&lookup, "1.1.1.1", "example.com", &config(0)).await;
        assert!(result.is_timeout());
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_record_not_retried() {
        let lookup = ScriptedLookup::with_default(Step::NoRecord);

        let result = probe(&lookup, "1.1.1.1", "missing.invalid", &config(3)).await;
        assert_eq!(result.error_kind(), Some(ProbeErrorKind::NoRecord));
        assert!(result.response_time().is_none());
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_not_retried() {
        let lookup = ScriptedLookup::with_default(Step::Fail("connection refused"));

        let result = probe(&lookup, "1.1.1.1", "example.com", &config(3)).await;
        let err = result.error().unwrap();
        assert_eq!(err.kind, ProbeErrorKind::Unexpected);
        assert!(err.message.contains("connection refused"));
        assert!(err.message.contains("1.1.1.1"));
        assert_eq!(lookup.calls(), 1);
    }
}
