//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports three commands: running a probe (the default), listing the
//! resolver catalog with its health, and showing or resetting the stored
//! failure history.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Run(args)) => { /* ... */ }
///     Some(Commands::History { reset }) => { /* ... */ }
///     None => { /* run with defaults */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnsprobe",
    version,
    about = "DNS resolver speed test",
    long_about = "Ranks DNS resolvers by response time over a catalog of popular domains, \
                  skipping resolvers that keep failing across runs",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Also write detailed logs to this file
    #[arg(long, global = true, env = "DNSPROBE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Failure history file (default: $CONFIG_DIR/dnsprobe/history.json)
    #[arg(long, global = true, env = "DNSPROBE_HISTORY")]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default, human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated)
    Tsv,
}

impl OutputFormat {
    /// Get all available output format names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["table", "json", "csv", "tsv"]
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
        }
    }
}

/// Where the resolver and domain catalogs come from.
#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    /// Resolver list file (JSON: {"resolvers": [{"address", "description"}]})
    #[arg(long = "resolvers-file")]
    pub resolvers_file: Option<PathBuf>,

    /// Custom resolvers (format: IP#Description, repeatable)
    #[arg(short = 'r', long = "resolver")]
    pub resolvers: Vec<String>,

    /// Domain list file (one domain per line)
    #[arg(long = "domains-file")]
    pub domains_file: Option<PathBuf>,
}

/// Settings for a run. Flags override values from `--config`.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Settings file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Timeout for DNS queries in seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Maximum number of retries for timed-out queries
    #[arg(long)]
    pub retries: Option<u32>,

    /// Number of resolvers tested in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Consecutive failed runs before a resolver is dropped
    #[arg(long = "max-failures")]
    pub max_failures: Option<u32>,

    /// Minimum success rate to consider a resolver healthy (reserved)
    #[arg(long = "min-success-rate")]
    pub min_success_rate: Option<f64>,

    /// Consecutive timeouts before skipping a resolver's remaining domains
    #[arg(long = "quick-fail")]
    pub quick_fail: Option<u32>,
}

/// Available commands for the dnsprobe CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Test every eligible resolver and rank them by response time
    ///
    /// This is the default when no command is given.
    #[command(alias = "r")]
    Run(RunArgs),

    /// List the resolver catalog with each resolver's stored health
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Consecutive failed runs before a resolver is dropped
        #[arg(long = "max-failures")]
        max_failures: Option<u32>,

        /// Settings file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the stored failure history
    #[command(alias = "h")]
    History {
        /// Clear the stored history
        #[arg(long)]
        reset: bool,
    },
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
