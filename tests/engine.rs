//! End-to-end runs of the engine over a scripted lookup and an on-disk
//! failure history.

use dnsprobe::dns::run_resolver;
use dnsprobe::{
    Catalog, Config, Engine, HistoryStore, JsonHistoryStore, Lookup, LookupError, ProbeErrorKind,
    Resolver, RunReport,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FAST: &str = "192.0.2.1";
const FLAKY: &str = "192.0.2.2";

/// Resolver `FAST` answers domain `dN` after N ms. Resolver `FLAKY` times
/// out on the domains in `flaky_timeouts` and answers the rest after 1 ms.
#[derive(Default)]
struct FakeLookup {
    flaky_timeouts: HashSet<String>,
    flaky_calls: AtomicUsize,
}

impl FakeLookup {
    fn flaky_on(domains: &[String]) -> Self {
        Self {
            flaky_timeouts: domains.iter().cloned().collect(),
            flaky_calls: AtomicUsize::new(0),
        }
    }
}

impl Lookup for FakeLookup {
    async fn lookup(&self, resolver: &str, domain: &str, _timeout: Duration) -> Result<(), LookupError> {
        match resolver {
            FAST => {
                let ms: u64 = domain
                    .trim_start_matches('d')
                    .trim_end_matches(".example")
                    .parse()
                    .map_err(|_| LookupError::Other(format!("bad domain {domain}")))?;
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
            FLAKY => {
                self.flaky_calls.fetch_add(1, Ordering::SeqCst);
                if self.flaky_timeouts.contains(domain) {
                    Err(LookupError::Timeout)
                } else {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok(())
                }
            }
            _ => Err(LookupError::NoRecord(domain.to_string())),
        }
    }
}

fn domains() -> Vec<String> {
    (1..=50).map(|i| format!("d{i}.example")).collect()
}

fn catalog() -> Catalog {
    Catalog::new(
        vec![Resolver::new(FAST, "Fast"), Resolver::new(FLAKY, "Flaky")],
        domains(),
    )
}

async fn complete<L: Lookup>(engine: &Engine<L, JsonHistoryStore>) -> RunReport {
    engine
        .run_until(std::future::pending())
        .await
        .unwrap()
        .into_report()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_fast_resolver_mean_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonHistoryStore::new(dir.path().join("history.json"));
    let engine = Engine::new(Config::default(), catalog(), FakeLookup::default(), store).unwrap();

    let report = complete(&engine).await;
    let fast = report
        .resolvers
        .iter()
        .find(|r| r.resolver.address == FAST)
        .unwrap();

    assert_eq!(fast.statistics.successful_queries, 50);
    assert!((fast.statistics.mean_ms - 25.5).abs() < 1e-6);
    assert!((fast.statistics.min_ms - 1.0).abs() < 1e-6);
    assert!((fast.statistics.max_ms - 50.0).abs() < 1e-6);
    assert_eq!(engine.store().load().failures(FAST), 0);
}

#[tokio::test(start_paused = true)]
async fn test_quick_fail_skips_remaining_domains() {
    let domains = domains();
    let lookup = FakeLookup::flaky_on(&domains[..3]);
    let config = Config::default();
    let resolver = Resolver::new(FLAKY, "Flaky");

    let run = run_resolver(&lookup, &resolver, &domains, &config).await;
    assert_eq!(run.len(), 50);
    assert_eq!(run.count(ProbeErrorKind::Timeout), 3);
    assert_eq!(run.count(ProbeErrorKind::Skipped), 47);
    assert!(run.results()[3..]
        .iter()
        .all(|r| r.error_kind() == Some(ProbeErrorKind::Skipped)));
    // One retry per timed-out domain, nothing after the trip
    assert_eq!(lookup.flaky_calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_failing_resolver_is_dropped_after_repeated_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let lookup = Arc::new(FakeLookup::flaky_on(&domains()[..3]));

    for run in 1..=3 {
        let engine = Engine::new(
            Config::default(),
            catalog(),
            SharedLookup(Arc::clone(&lookup)),
            JsonHistoryStore::new(&path),
        )
        .unwrap();
        let report = complete(&engine).await;
        assert!(report.dropped.is_empty());

        let flaky = report
            .resolvers
            .iter()
            .find(|r| r.resolver.address == FLAKY)
            .unwrap();
        assert!(!flaky.is_success());
        assert_eq!(flaky.statistics.total_queries, 50);
        assert_eq!(flaky.health.consecutive_failures, run);
        assert_eq!(JsonHistoryStore::new(&path).load().failures(FLAKY), run);
    }

    let calls_before = lookup.flaky_calls.load(Ordering::SeqCst);
    let engine = Engine::new(
        Config::default(),
        catalog(),
        SharedLookup(Arc::clone(&lookup)),
        JsonHistoryStore::new(&path),
    )
    .unwrap();
    let report = complete(&engine).await;

    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].resolver.address, FLAKY);
    assert_eq!(report.dropped[0].consecutive_failures, 3);
    assert_eq!(report.resolvers.len(), 1);
    assert_eq!(lookup.flaky_calls.load(Ordering::SeqCst), calls_before);
    assert_eq!(engine.store().load().failures(FLAKY), 3);
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_run_leaves_history_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, r#"{"192.0.2.2": 1}"#).unwrap();

    let engine = Engine::new(
        Config::default(),
        catalog(),
        FakeLookup::default(),
        JsonHistoryStore::new(&path),
    )
    .unwrap();
    let outcome = engine
        .run_until(tokio::time::sleep(Duration::from_millis(5)))
        .await
        .unwrap();

    assert!(outcome.into_report().is_none());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"192.0.2.2": 1}"#);
}

/// Lets consecutive engines share one lookup and its call counter.
struct SharedLookup(Arc<FakeLookup>);

impl Lookup for SharedLookup {
    async fn lookup(&self, resolver: &str, domain: &str, timeout: Duration) -> Result<(), LookupError> {
        self.0.lookup(resolver, domain, timeout).await
    }
}
