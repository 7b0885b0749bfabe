//! Cross-run resolver health.
//!
//! Each resolver carries a consecutive-failed-runs counter that survives
//! between runs. A resolver whose counter reaches the drop threshold is no
//! longer scheduled. The counters live in a [`FailureHistory`] that is
//! loaded once per run and written back once, through a [`HistoryStore`].

use crate::dns::types::Resolver;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Consecutive failed runs per resolver address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureHistory(BTreeMap<String, u32>);

impl FailureHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored failure count for `address`; unknown resolvers count as 0.
    #[must_use]
    pub fn failures(&self, address: &str) -> u32 {
        self.0.get(address).copied().unwrap_or(0)
    }

    pub fn set(&mut self, address: impl Into<String>, failures: u32) {
        self.0.insert(address.into(), failures);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(address, failures)| (address.as_str(), *failures))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u32)> for FailureHistory {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Health of one resolver across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub consecutive_failures: u32,
    pub drop_threshold: u32,
}

impl HealthRecord {
    #[must_use]
    pub fn new(consecutive_failures: u32, drop_threshold: u32) -> Self {
        Self {
            consecutive_failures,
            drop_threshold,
        }
    }

    /// Whether the resolver should be scheduled this run.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.consecutive_failures < self.drop_threshold
    }

    /// Runs left before the resolver is dropped.
    #[must_use]
    pub fn remaining_attempts(&self) -> u32 {
        self.drop_threshold.saturating_sub(self.consecutive_failures)
    }

    /// Record after a run: success clears the counter, failure bumps it.
    #[must_use]
    pub fn after_run(self, succeeded: bool) -> Self {
        let consecutive_failures = if succeeded {
            0
        } else {
            self.consecutive_failures.saturating_add(1)
        };
        Self {
            consecutive_failures,
            ..self
        }
    }
}

/// A resolver left out of this run, with its stored failure count.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedResolver {
    pub resolver: Resolver,
    pub consecutive_failures: u32,
}

/// Result of filtering the catalog for a run.
#[derive(Debug, Clone, Default)]
pub struct Eligibility {
    pub eligible: Vec<Resolver>,
    pub dropped: Vec<DroppedResolver>,
}

/// Owner of the failure history during a run.
///
/// The engine holds the only instance; worker tasks never see it.
#[derive(Debug, Clone)]
pub struct HealthTracker {
    history: FailureHistory,
    drop_threshold: u32,
}

impl HealthTracker {
    #[must_use]
    pub fn new(history: FailureHistory, drop_threshold: u32) -> Self {
        Self {
            history,
            drop_threshold,
        }
    }

    #[must_use]
    pub fn record(&self, address: &str) -> HealthRecord {
        HealthRecord::new(self.history.failures(address), self.drop_threshold)
    }

    /// Split the catalog into resolvers to schedule and resolvers to drop,
    /// preserving catalog order in both.
    #[must_use]
    pub fn partition(&self, resolvers: &[Resolver]) -> Eligibility {
        let mut eligibility = Eligibility::default();
        for resolver in resolvers {
            let record = self.record(&resolver.address);
            if record.is_eligible() {
                eligibility.eligible.push(resolver.clone());
            } else {
                eligibility.dropped.push(DroppedResolver {
                    resolver: resolver.clone(),
                    consecutive_failures: record.consecutive_failures,
                });
            }
        }
        eligibility
    }

    /// Apply one run's outcome and return the updated record.
    pub fn update(&mut self, address: &str, succeeded: bool) -> HealthRecord {
        let record = self.record(address).after_run(succeeded);
        self.history.set(address, record.consecutive_failures);
        record
    }

    #[must_use]
    pub fn history(&self) -> &FailureHistory {
        &self.history
    }
}

/// Load/save boundary for the failure history.
pub trait HistoryStore {
    /// Load the history. A missing or unreadable document yields an empty
    /// history; it is never an error.
    fn load(&self) -> FailureHistory;

    /// Replace the stored history with `history`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn save(&self, history: &FailureHistory) -> Result<()>;
}

/// Failure history kept as a JSON object keyed by resolver address.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the stored history, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> FailureHistory {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FailureHistory::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read history, starting empty: {e}");
                return FailureHistory::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "corrupt history, starting empty: {e}");
            FailureHistory::new()
        })
    }

    fn save(&self, history: &FailureHistory) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(history)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "history saved");
        Ok(())
    }
}
