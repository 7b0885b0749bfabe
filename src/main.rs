//! dnsprobe - DNS resolver speed ranking
//!
//! Binary entry point for the dnsprobe CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::Context;
use dnsprobe::cli::{CatalogArgs, Commands, OutputFormat, RunArgs};
use dnsprobe::config::{default_domains, default_resolvers, Catalog, Config, ConfigLoader};
use dnsprobe::engine::{Engine, RunOutcome};
use dnsprobe::health::{HealthTracker, HistoryStore, JsonHistoryStore};
use dnsprobe::report;
use dnsprobe::TrustDnsLookup;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Exit status when the run was stopped by Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// Set up logging based on verbosity level.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
/// * `log_file` - Also write debug-level logs to this file
fn setup_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_filter(filter))
        .with(file_layer)
        .init();
    Ok(())
}

/// Build the run settings: defaults, then the config file, then flags.
fn load_config(args: &RunArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    if let Some(max_failures) = args.max_failures {
        config.max_consecutive_failures = max_failures;
    }
    if let Some(rate) = args.min_success_rate {
        config.min_success_rate = rate;
    }
    if let Some(quick_fail) = args.quick_fail {
        config.quick_fail_threshold = quick_fail;
    }

    config.validate()?;
    Ok(config)
}

/// Load the resolver and domain catalogs.
///
/// Resolvers given with `--resolver` take precedence over a resolver file.
fn load_catalog(args: &CatalogArgs) -> anyhow::Result<Catalog> {
    let resolvers = if !args.resolvers.is_empty() {
        ConfigLoader::resolvers_from_args(args.resolvers.clone())?
    } else if let Some(path) = &args.resolvers_file {
        ConfigLoader::load_resolvers(path)
            .with_context(|| format!("failed to load resolvers from {}", path.display()))?
    } else {
        default_resolvers()
    };

    let domains = match &args.domains_file {
        Some(path) => ConfigLoader::load_domains(path)
            .with_context(|| format!("failed to load domains from {}", path.display()))?,
        None => default_domains(),
    };

    Ok(Catalog::new(resolvers, domains))
}

/// Resolves when Ctrl-C is pressed. Never resolves if the signal handler
/// cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Probe every eligible resolver and print the ranking.
async fn run_probe(args: RunArgs, store: JsonHistoryStore, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let config = load_config(&args)?;
    let catalog = load_catalog(&args.catalog)?;

    if format != OutputFormat::Json {
        report::print_config_summary(&config, &catalog);
    }

    let engine = Engine::new(config, catalog, TrustDnsLookup::new(), store)?;
    match engine.run_until(shutdown_signal()).await? {
        RunOutcome::Completed(run) => {
            report::print_report(&run, format)?;
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Interrupted => {
            eprintln!("\nInterrupted, failure history left unchanged.");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

/// List the catalog with each resolver's stored health.
fn run_list(
    catalog: &CatalogArgs,
    config: Option<PathBuf>,
    max_failures: Option<u32>,
    store: &JsonHistoryStore,
) -> anyhow::Result<ExitCode> {
    let config = load_config(&RunArgs {
        config,
        max_failures,
        ..RunArgs::default()
    })?;
    let catalog = load_catalog(catalog)?;

    let history = store.load();
    let eligibility =
        HealthTracker::new(history.clone(), config.max_consecutive_failures).partition(&catalog.resolvers);
    report::print_catalog(&catalog, &eligibility, &history);
    Ok(ExitCode::SUCCESS)
}

/// Show or clear the failure history.
fn run_history(reset: bool, store: &JsonHistoryStore, format: OutputFormat) -> anyhow::Result<ExitCode> {
    if reset {
        store.reset()?;
        println!("Failure history cleared: {}", store.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    let history = store.load();
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        report::print_history(&history);
    }
    Ok(ExitCode::SUCCESS)
}

/// Main entry point for the dnsprobe CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = dnsprobe::cli::parse();
    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    tracing::debug!("dnsprobe starting");

    let store = JsonHistoryStore::new(cli.history.unwrap_or_else(ConfigLoader::default_history_path));

    let result = match cli.command {
        Some(Commands::Run(args)) => run_probe(args, store, cli.format).await,
        Some(Commands::List {
            catalog,
            max_failures,
            config,
        }) => run_list(&catalog, config, max_failures, &store),
        Some(Commands::History { reset }) => run_history(reset, &store, cli.format),
        None => run_probe(RunArgs::default(), store, cli.format).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
