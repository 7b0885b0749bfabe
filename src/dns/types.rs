//! DNS types and data structures.
//!
//! This module provides the core types used for resolver representation
//! and probe results.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Default DNS port used when a resolver address carries none.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Message attached to results backfilled by a tripped quick-fail breaker.
pub const SKIPPED_MESSAGE: &str = "Skipped after multiple failures";

/// DNS resolver catalog entry.
///
/// Identified by its address string; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Resolver {
    /// Address of the resolver (`IP`, `IP:port` or `[IPv6]:port`)
    pub address: String,
    /// Human-readable description (e.g., "Google Public DNS")
    pub description: String,
}

impl Resolver {
    /// Create a new resolver entry.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let resolver = Resolver::new("1.1.1.1", "Cloudflare DNS");
    /// ```
    pub fn new(address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            description: description.into(),
        }
    }

    /// Parse the address into a socket address, defaulting to port 53.
    ///
    /// Accepts `1.1.1.1`, `1.1.1.1:5353`, `2606:4700::1111` and
    /// `[2606:4700::1111]:53`.
    #[must_use]
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let trimmed = self.address.trim();
        if let Ok(addr) = trimmed.parse::<SocketAddr>() {
            return Some(addr);
        }
        trimmed
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
    }
}

impl fmt::Display for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.description)
    }
}

/// Classification of a failed probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    /// The domain has no answer or does not exist. Never retried.
    NoRecord,
    /// Every attempt timed out.
    Timeout,
    /// Any other failure (network, malformed response, server error).
    Unexpected,
    /// Not probed because the quick-fail breaker tripped.
    Skipped,
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecord => write!(f, "no-record"),
            Self::Timeout => write!(f, "timeout"),
            Self::Unexpected => write!(f, "unexpected"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// A classified probe failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError {
    pub kind: ProbeErrorKind,
    pub message: String,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// What a probe produced: either a response time or a classified error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Answered(Duration),
    Failed(ProbeError),
}

/// Result of probing one domain against one resolver.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub outcome: ProbeOutcome,
    pub timestamp: DateTime<Local>,
}

impl ProbeResult {
    /// Create a successful result.
    #[must_use]
    pub fn answered(response_time: Duration) -> Self {
        Self {
            outcome: ProbeOutcome::Answered(response_time),
            timestamp: Local::now(),
        }
    }

    /// Create a failed result.
    pub fn failed(kind: ProbeErrorKind, message: impl Into<String>) -> Self {
        Self {
            outcome: ProbeOutcome::Failed(ProbeError {
                kind,
                message: message.into(),
            }),
            timestamp: Local::now(),
        }
    }

    /// Create a synthetic result for a domain left unprobed by the breaker.
    #[must_use]
    pub fn skipped() -> Self {
        Self::failed(ProbeErrorKind::Skipped, SKIPPED_MESSAGE)
    }

    /// Response time, if the probe succeeded.
    #[must_use]
    pub fn response_time(&self) -> Option<Duration> {
        match &self.outcome {
            ProbeOutcome::Answered(elapsed) => Some(*elapsed),
            ProbeOutcome::Failed(_) => None,
        }
    }

    /// Response time in milliseconds, if the probe succeeded.
    #[must_use]
    pub fn response_ms(&self) -> Option<f64> {
        self.response_time().map(|d| d.as_nanos() as f64 / 1_000_000.0)
    }

    /// Classified error, if the probe failed.
    #[must_use]
    pub fn error(&self) -> Option<&ProbeError> {
        match &self.outcome {
            ProbeOutcome::Answered(_) => None,
            ProbeOutcome::Failed(err) => Some(err),
        }
    }

    /// Error classification, if the probe failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<ProbeErrorKind> {
        self.error().map(|e| e.kind)
    }

    /// Check if the probe produced a response time.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Answered(_))
    }

    /// Check if the probe failed with a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.error_kind() == Some(ProbeErrorKind::Timeout)
    }
}

/// All probe results of one resolver in one run, in domain catalog order.
///
/// The length always equals the domain catalog length.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    results: Vec<ProbeResult>,
}

impl RunResult {
    #[must_use]
    pub fn new(results: Vec<ProbeResult>) -> Self {
        Self { results }
    }

    #[must_use]
    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Response times of the successful probes, in milliseconds.
    #[must_use]
    pub fn response_times_ms(&self) -> Vec<f64> {
        self.results.iter().filter_map(ProbeResult::response_ms).collect()
    }

    /// Number of probes that produced a response time.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// A run succeeds if at least one probe produced a response time.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().any(ProbeResult::is_success)
    }

    /// Number of probes with the given error classification.
    #[must_use]
    pub fn count(&self, kind: ProbeErrorKind) -> usize {
        self.results
            .iter()
            .filter(|r| r.error_kind() == Some(kind))
            .count()
    }
}
