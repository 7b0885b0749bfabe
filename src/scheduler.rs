//! Bounded-concurrency scheduler for resolver tasks.
//!
//! At most `max_workers` resolver tasks run at once. Each worker slot runs
//! one task to completion before the next pending resolver is started.
//! Completions are yielded in arrival order, not catalog order.

use crate::config::Config;
use crate::dns::lookup::Lookup;
use crate::dns::task::run_resolver;
use crate::dns::types::{Resolver, RunResult};
use crate::error::Result;
use futures::Stream;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;

/// A finished resolver task.
#[derive(Debug, Clone)]
pub struct Completion {
    pub resolver: Resolver,
    pub run: RunResult,
}

/// Worker pool running one resolver task per resolver.
///
/// Dropping the scheduler aborts every task still running.
///
/// # Example
///
/// ```ignore
/// let mut scheduler = Scheduler::new(lookup, domains, config, resolvers);
/// while let Some(completion) = scheduler.next().await {
///     let completion = completion?;
///     println!("{}: {} answered", completion.resolver, completion.run.successful());
/// }
/// ```
pub struct Scheduler<L: Lookup> {
    lookup: Arc<L>,
    domains: Arc<[String]>,
    config: Arc<Config>,
    pending: VecDeque<Resolver>,
    running: JoinSet<Completion>,
}

impl<L: Lookup> Scheduler<L> {
    pub fn new(
        lookup: Arc<L>,
        domains: Arc<[String]>,
        config: Arc<Config>,
        resolvers: Vec<Resolver>,
    ) -> Self {
        Self {
            lookup,
            domains,
            config,
            pending: resolvers.into(),
            running: JoinSet::new(),
        }
    }

    /// Wait for the next resolver task to finish.
    ///
    /// Returns `None` once every resolver has completed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Scheduler`] if a task panicked or was
    /// cancelled. The run cannot be trusted after that.
    pub async fn next(&mut self) -> Option<Result<Completion>> {
        self.fill();
        let joined = self.running.join_next().await?;
        self.fill();
        Some(joined.map_err(Into::into))
    }

    /// Turn the scheduler into a stream of completions.
    pub fn into_stream(self) -> impl Stream<Item = Result<Completion>> {
        futures::stream::unfold(self, |mut scheduler| async move {
            let item = scheduler.next().await?;
            Some((item, scheduler))
        })
    }

    fn fill(&mut self) {
        let max_workers = self.config.max_workers.max(1);
        while self.running.len() < max_workers {
            let Some(resolver) = self.pending.pop_front() else {
                break;
            };
            self.spawn(resolver);
        }
    }

    fn spawn(&mut self, resolver: Resolver) {
        let lookup = Arc::clone(&self.lookup);
        let domains = Arc::clone(&self.domains);
        let config = Arc::clone(&self.config);

        tracing::debug!(resolver = %resolver.address, "starting resolver task");
        self.running.spawn(async move {
            let run = run_resolver(lookup.as_ref(), &resolver, &domains, &config).await;
            Completion { resolver, run }
        });
    }
}
