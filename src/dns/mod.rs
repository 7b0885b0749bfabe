//! DNS module.
//!
//! This module provides the probing side of the engine:
//! - The resolution primitive and its classified errors
//! - Retried, classified probes
//! - The per-run quick-fail breaker
//! - Resolver tasks that run a resolver over the whole domain catalog
//! - Core data types

pub mod breaker;
pub mod lookup;
pub mod probe;
pub mod task;
pub mod types;

pub use breaker::QuickFailBreaker;
pub use lookup::{Lookup, LookupError, TrustDnsLookup};
pub use probe::probe;
pub use task::run_resolver;
pub use types::*;
