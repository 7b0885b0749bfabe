//! Configuration module.
//!
//! This module provides the engine settings, the resolver and domain
//! catalogs, and functionality for loading them from various sources.

pub mod catalog;
pub mod loader;
pub mod settings;

pub use catalog::{default_domains, default_resolvers, Catalog, ResolverList};
pub use loader::ConfigLoader;
pub use settings::Config;
