//! Run orchestration.
//!
//! The engine loads the failure history, filters the catalog, schedules the
//! eligible resolvers and consumes their completions in one loop. That loop
//! is the only place the history is mutated, and it is saved once, after
//! every scheduled resolver has completed.

use crate::config::{Catalog, Config};
use crate::dns::lookup::Lookup;
use crate::dns::types::Resolver;
use crate::error::Result;
use crate::health::{DroppedResolver, Eligibility, HealthRecord, HealthTracker, HistoryStore};
use crate::scheduler::{Completion, Scheduler};
use crate::stats::{self, RunStatistics};
use futures::StreamExt;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Outcome of one scheduled resolver.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverReport {
    pub resolver: Resolver,
    pub statistics: RunStatistics,
    /// Health after this run's outcome was applied
    pub health: HealthRecord,
}

impl ResolverReport {
    /// A run succeeds if at least one domain was answered.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.statistics.has_measurements()
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Resolvers excluded before scheduling, in catalog order
    pub dropped: Vec<DroppedResolver>,
    /// Scheduled resolvers, in completion order
    pub resolvers: Vec<ResolverReport>,
}

impl RunReport {
    /// Resolvers with measurements, fastest mean first.
    #[must_use]
    pub fn ranking(&self) -> Vec<&ResolverReport> {
        stats::rank(&self.resolvers, |r| &r.statistics)
    }
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Stopped by the shutdown signal; the failure history was not saved.
    Interrupted,
}

impl RunOutcome {
    /// The report of a completed run.
    #[must_use]
    pub fn into_report(self) -> Option<RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Interrupted => None,
        }
    }
}

/// Probing engine over an injected catalog, lookup and history store.
pub struct Engine<L: Lookup, S: HistoryStore> {
    config: Arc<Config>,
    resolvers: Vec<Resolver>,
    domains: Arc<[String]>,
    lookup: Arc<L>,
    store: S,
}

impl<L: Lookup, S: HistoryStore> Engine<L, S> {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config, catalog: Catalog, lookup: L, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            resolvers: catalog.resolvers,
            domains: catalog.domains.into(),
            lookup: Arc::new(lookup),
            store,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Which resolvers the next run would schedule, from the stored history.
    #[must_use]
    pub fn eligibility(&self) -> Eligibility {
        self.tracker().partition(&self.resolvers)
    }

    /// Run until every eligible resolver completes or `shutdown` resolves.
    ///
    /// On shutdown no further resolvers are started, running ones are
    /// aborted, and the failure history is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on a scheduler fault or if the history cannot be
    /// saved.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunOutcome>
    where
        F: Future<Output = ()>,
    {
        let mut tracker = self.tracker();
        let Eligibility { eligible, dropped } = tracker.partition(&self.resolvers);

        for d in &dropped {
            tracing::info!(
                resolver = %d.resolver.address,
                failures = d.consecutive_failures,
                "resolver dropped after consecutive failed runs"
            );
        }
        tracing::info!(
            resolvers = eligible.len(),
            domains = self.domains.len(),
            workers = self.config.max_workers,
            "starting run"
        );

        let completions = Scheduler::new(
            Arc::clone(&self.lookup),
            Arc::clone(&self.domains),
            Arc::clone(&self.config),
            eligible,
        )
        .into_stream();
        tokio::pin!(completions);
        tokio::pin!(shutdown);

        let mut reports = Vec::new();
        loop {
            let completion = tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::warn!(
                        completed = reports.len(),
                        "run interrupted, failure history not saved"
                    );
                    return Ok(RunOutcome::Interrupted);
                }
                next = completions.next() => match next {
                    Some(Ok(completion)) => completion,
                    Some(Err(e)) => {
                        tracing::error!(completed = reports.len(), "scheduler fault, aborting run: {e}");
                        return Err(e);
                    }
                    None => break,
                },
            };
            reports.push(self.record(&mut tracker, completion));
        }

        self.store.save(tracker.history())?;
        Ok(RunOutcome::Completed(RunReport {
            dropped,
            resolvers: reports,
        }))
    }

    fn tracker(&self) -> HealthTracker {
        HealthTracker::new(self.store.load(), self.config.max_consecutive_failures)
    }

    fn record(&self, tracker: &mut HealthTracker, completion: Completion) -> ResolverReport {
        let Completion { resolver, run } = completion;
        let statistics = stats::summarize(&run);
        let health = tracker.update(&resolver.address, run.is_success());

        if run.is_success() {
            tracing::info!(
                resolver = %resolver.address,
                mean_ms = statistics.mean_ms,
                answered = statistics.successful_queries,
                total = statistics.total_queries,
                "resolver finished"
            );
        } else {
            tracing::info!(
                resolver = %resolver.address,
                failures = health.consecutive_failures,
                remaining = health.remaining_attempts(),
                "resolver had no successful queries"
            );
        }

        ResolverReport {
            resolver,
            statistics,
            health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::probe::testing::{ScriptedLookup, Step};
    use crate::health::FailureHistory;
    use std::cell::RefCell;
    use std::time::Duration;

    /// In-memory store that counts saves.
    #[derive(Default)]
    struct MemoryStore {
        history: RefCell<FailureHistory>,
        saves: RefCell<usize>,
    }

    impl HistoryStore for MemoryStore {
        fn load(&self) -> FailureHistory {
            self.history.borrow().clone()
        }

        fn save(&self, history: &FailureHistory) -> Result<()> {
            *self.history.borrow_mut() = history.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Resolver::new("1.1.1.1", "Fast"),
                Resolver::new("10.0.0.1", "Dead"),
            ],
            (1..=5).map(|i| format!("d{i}.example")).collect(),
        )
    }

    fn lookup() -> ScriptedLookup {
        let lookup = ScriptedLookup::new();
        for i in 1..=5 {
            let domain = format!("d{i}.example");
            lookup.script("1.1.1.1", &domain, [Step::Answer(Duration::from_millis(i * 10))]);
            lookup.script("10.0.0.1", &domain, [Step::Timeout, Step::Timeout]);
        }
        lookup
    }

    async fn complete<L: Lookup, S: HistoryStore>(engine: &Engine<L, S>) -> RunReport {
        engine
            .run_until(std::future::pending())
            .await
            .unwrap()
            .into_report()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_updates_and_saves_history() {
        let store = MemoryStore::default();
        store.history.borrow_mut().set("1.1.1.1", 2);
        let engine = Engine::new(Config::default(), catalog(), lookup(), store).unwrap();

        let report = complete(&engine).await;
        assert_eq!(report.resolvers.len(), 2);
        assert!(report.dropped.is_empty());

        let history = engine.store().load();
        assert_eq!(history.failures("1.1.1.1"), 0);
        assert_eq!(history.failures("10.0.0.1"), 1);
        assert_eq!(*engine.store().saves.borrow(), 1);

        let ranking = report.ranking();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].resolver.address, "1.1.1.1");
        assert!((ranking[0].statistics.mean_ms - 30.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dropped_resolver_not_probed() {
        let store = MemoryStore::default();
        store.history.borrow_mut().set("10.0.0.1", 3);
        let lookup = ScriptedLookup::new();
        let engine = Engine::new(Config::default(), catalog(), lookup, store).unwrap();

        let report = complete(&engine).await;
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].consecutive_failures, 3);
        assert_eq!(report.resolvers.len(), 1);
        assert_eq!(engine.lookup.calls(), 5);
        assert_eq!(engine.store().load().failures("10.0.0.1"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_skips_save() {
        let store = MemoryStore::default();
        store.history.borrow_mut().set("10.0.0.1", 1);
        let lookup = ScriptedLookup::with_default(Step::Answer(Duration::from_secs(30)));
        let engine = Engine::new(Config::default(), catalog(), lookup, store).unwrap();

        let outcome = engine
            .run_until(tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Interrupted));
        assert_eq!(*engine.store().saves.borrow(), 0);
        assert_eq!(engine.store().load().failures("10.0.0.1"), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            max_workers: 0,
            ..Config::default()
        };
        let result = Engine::new(config, catalog(), ScriptedLookup::new(), MemoryStore::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_eligibility_uses_max_consecutive_failures() {
        let store = MemoryStore::default();
        store.history.borrow_mut().set("10.0.0.1", 3);
        let config = Config {
            max_consecutive_failures: 4,
            ..Config::default()
        };
        let engine = Engine::new(config, catalog(), ScriptedLookup::new(), store).unwrap();
        assert!(engine.eligibility().dropped.is_empty());
    }
}
