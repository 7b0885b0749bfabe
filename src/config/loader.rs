//! Configuration and catalog loader.
//!
//! This module provides functionality to load settings, resolver lists and
//! domain lists from files, command-line arguments, or default locations.

use crate::config::catalog::ResolverList;
use crate::config::settings::Config;
use crate::dns::types::Resolver;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the per-user directory holding dnsprobe state.
const APP_DIR: &str = "dnsprobe";

/// File name of the failure history inside the config directory.
const HISTORY_FILE: &str = "history.json";

/// Configuration loader.
///
/// Provides various methods to load settings and catalogs from different
/// sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a JSON file.
    ///
    /// Missing fields take their default values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds an
    /// invalid value.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a resolver list from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it lists
    /// the same address twice.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let resolvers = ConfigLoader::load_resolvers("resolvers.json")?;
    /// for resolver in &resolvers {
    ///     println!("{}: {}", resolver.description, resolver.address);
    /// }
    /// ```
    pub fn load_resolvers<P: AsRef<Path>>(path: P) -> Result<Vec<Resolver>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let list: ResolverList = serde_json::from_str(&content)?;
        Self::check_unique(&list.resolvers)?;
        Ok(list.resolvers)
    }

    /// Load a domain list from a text file, one domain per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or lists no domains.
    pub fn load_domains<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let domains: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();

        if domains.is_empty() {
            return Err(Error::config(format!(
                "no domains found in {}",
                path.as_ref().display()
            )));
        }
        Ok(domains)
    }

    /// Create a resolver list from command-line arguments.
    ///
    /// # Arguments
    ///
    /// * `args` - Strings in format "IP#Description"; the description
    ///   defaults to the address
    ///
    /// # Errors
    ///
    /// Returns an error if any address is invalid or repeated.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let args = vec!["8.8.8.8#Google".to_string(), "1.1.1.1:53#Cloudflare".to_string()];
    /// let resolvers = ConfigLoader::resolvers_from_args(args)?;
    /// ```
    pub fn resolvers_from_args(args: Vec<String>) -> Result<Vec<Resolver>> {
        let mut resolvers = Vec::with_capacity(args.len());
        for arg in args {
            let (address, description) = match arg.split_once('#') {
                Some((address, description)) => (address.trim(), description.trim()),
                None => (arg.trim(), arg.trim()),
            };

            let resolver = Resolver::new(address, description);
            if resolver.socket_addr().is_none() {
                return Err(Error::parse(format!("Invalid resolver address: {address}")));
            }
            resolvers.push(resolver);
        }
        Self::check_unique(&resolvers)?;
        Ok(resolvers)
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Default location of the failure history.
    #[must_use]
    pub fn default_history_path() -> PathBuf {
        Self::config_dir().join(HISTORY_FILE)
    }

    fn check_unique(resolvers: &[Resolver]) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for resolver in resolvers {
            if !seen.insert(resolver.address.as_str()) {
                return Err(Error::config(format!(
                    "duplicate resolver address: {}",
                    resolver.address
                )));
            }
        }
        Ok(())
    }
}
