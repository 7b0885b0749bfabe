//! Resolver task: one resolver against the whole domain catalog.
//!
//! Domains are probed strictly in catalog order, since the quick-fail
//! breaker only makes sense over an ordered sequence of outcomes.

use crate::config::Config;
use crate::dns::breaker::QuickFailBreaker;
use crate::dns::lookup::Lookup;
use crate::dns::probe::probe;
use crate::dns::types::{ProbeResult, Resolver, RunResult};

/// Probe every domain for `resolver` and return a complete [`RunResult`].
///
/// Once the breaker trips, the remaining domains are not probed and are
/// filled with skipped results, so the result always has one entry per
/// domain.
pub async fn run_resolver<L: Lookup>(
    lookup: &L,
    resolver: &Resolver,
    domains: &[String],
    config: &Config,
) -> RunResult {
    let mut breaker = QuickFailBreaker::new(config.quick_fail_threshold);
    let mut results = Vec::with_capacity(domains.len());

    for domain in domains {
        let result = probe(lookup, &resolver.address, domain, config).await;
        let tripped = breaker.record(&result);
        results.push(result);

        if tripped && results.len() < domains.len() {
            tracing::warn!(
                resolver = %resolver.address,
                skipped = domains.len() - results.len(),
                "skipping remaining domains after {} consecutive timeouts",
                breaker.consecutive_timeouts()
            );
            break;
        }
    }

    results.resize_with(domains.len(), ProbeResult::skipped);
    RunResult::new(results)
}
