//! dnsprobe - DNS resolver speed ranking.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Timing DNS lookups of a domain catalog against many resolvers
//! - Retrying timed-out queries and classifying failures
//! - Skipping a resolver's remaining domains after consecutive timeouts
//! - Dropping resolvers that keep failing across runs
//! - Multiple output formats (table, JSON, CSV, TSV)
//!
//! # Library Usage
//!
//! ```ignore
//! use dnsprobe::{Catalog, Config, Engine, JsonHistoryStore, TrustDnsLookup};
//!
//! let engine = Engine::new(
//!     Config::default(),
//!     Catalog::default(),
//!     TrustDnsLookup::new(),
//!     JsonHistoryStore::new("history.json"),
//! )?;
//! let outcome = engine.run_until(tokio::signal::ctrl_c().map(drop)).await?;
//! if let Some(report) = outcome.into_report() {
//!     for r in report.ranking() {
//!         println!("{}: {:.2} ms", r.resolver, r.statistics.mean_ms);
//!     }
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Probe the built-in catalog (default)
//! dnsprobe
//!
//! # Custom resolvers and settings
//! dnsprobe run -r 8.8.8.8#Google -r 1.1.1.1#Cloudflare --workers 4 --timeout 2
//!
//! # Catalog with stored health
//! dnsprobe list
//!
//! # Failure history
//! dnsprobe history
//! dnsprobe history --reset
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod engine;
pub mod error;
pub mod health;
pub mod report;
pub mod scheduler;
pub mod stats;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Catalog, Config, ConfigLoader};
pub use dns::types::{ProbeErrorKind, ProbeResult, Resolver, RunResult};
pub use dns::{Lookup, LookupError, TrustDnsLookup};
pub use engine::{Engine, ResolverReport, RunOutcome, RunReport};
pub use error::{Error, Result};
pub use health::{FailureHistory, HealthRecord, HistoryStore, JsonHistoryStore};
pub use stats::RunStatistics;
