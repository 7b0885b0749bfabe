//! Run report output.
//!
//! Renders what the engine produced: dropped resolvers, one summary line per
//! probed resolver, and the final ranking in the selected output format.

use crate::cli::OutputFormat;
use crate::config::{Catalog, Config};
use crate::engine::{ResolverReport, RunReport};
use crate::error::Result;
use crate::health::{DroppedResolver, Eligibility, FailureHistory};

/// Print the settings and catalog sizes a run starts with.
pub fn print_config_summary(config: &Config, catalog: &Catalog) {
    println!(
        "Testing {} resolvers against {} domains",
        catalog.resolvers.len(),
        catalog.domains.len()
    );
    println!(
        "timeout {:.2}s, {} retries, {} workers, quick-fail after {} timeouts, drop after {} failed runs, min success rate {:.0}%\n",
        config.timeout_secs,
        config.max_retries,
        config.max_workers,
        config.quick_fail_threshold,
        config.max_consecutive_failures,
        config.min_success_rate * 100.0
    );
}

/// Render resolvers excluded because of consistent failures.
#[must_use]
pub fn format_dropped(dropped: &[DroppedResolver]) -> String {
    if dropped.is_empty() {
        return String::new();
    }
    let mut out = String::from(
        "The following DNS resolvers have been dropped due to consistent failures:\n",
    );
    for d in dropped {
        out.push_str(&format!(
            "   - {}: {} consecutive failures\n",
            d.resolver, d.consecutive_failures
        ));
    }
    out
}

/// Render the one-line summary for a probed resolver.
#[must_use]
pub fn format_resolver_line(report: &ResolverReport) -> String {
    let stats = &report.statistics;
    if report.is_success() {
        format!(
            "[ok]   {}: Average response time: {:.2} ms ({}/{} successful queries)",
            report.resolver, stats.mean_ms, stats.successful_queries, stats.total_queries
        )
    } else {
        format!(
            "[fail] {}: No successful queries (Failed {} times, {} attempts remaining)",
            report.resolver,
            report.health.consecutive_failures,
            report.health.remaining_attempts()
        )
    }
}

/// Print the full report of a completed run.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let dropped = format_dropped(&report.dropped);
    if !dropped.is_empty() {
        println!("{dropped}");
    }
    for r in &report.resolvers {
        println!("{}", format_resolver_line(r));
    }
    println!();

    let ranking = report.ranking();
    match format {
        OutputFormat::Csv => print!("{}", format_ranking_delimited(&ranking, ',')),
        OutputFormat::Tsv => print!("{}", format_ranking_delimited(&ranking, '\t')),
        _ => print!("{}", format_ranking_table(&ranking)),
    }
    Ok(())
}

/// Render the ranking as an aligned table.
#[must_use]
pub fn format_ranking_table(ranking: &[&ResolverReport]) -> String {
    let mut out = String::from("=== DNS Resolver Performance ===\n");
    out.push_str(&format!(
        "{:<4} {:<40} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "#", "Resolver", "Min (ms)", "Max (ms)", "Avg (ms)", "Median", "Success"
    ));
    out.push_str(&"-".repeat(98));
    out.push('\n');

    if ranking.is_empty() {
        out.push_str("No resolver produced a valid measurement.\n");
        return out;
    }

    for (idx, r) in ranking.iter().enumerate() {
        let s = &r.statistics;
        out.push_str(&format!(
            "{:<4} {:<40} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>7.1}%\n",
            idx + 1,
            r.resolver.to_string(),
            s.min_ms,
            s.max_ms,
            s.mean_ms,
            s.median_ms,
            s.success_rate * 100.0
        ));
    }
    out
}

/// Render the ranking as CSV or TSV.
#[must_use]
pub fn format_ranking_delimited(ranking: &[&ResolverReport], sep: char) -> String {
    let header = [
        "#Rank", "Address", "Description", "Min(ms)", "Max(ms)", "Avg(ms)", "Median(ms)",
        "StdDev(ms)", "SuccessRate",
    ];
    let mut out = header.join(&sep.to_string());
    out.push('\n');

    for (idx, r) in ranking.iter().enumerate() {
        let s = &r.statistics;
        let fields = [
            (idx + 1).to_string(),
            r.resolver.address.clone(),
            r.resolver.description.clone(),
            format!("{:.2}", s.min_ms),
            format!("{:.2}", s.max_ms),
            format!("{:.2}", s.mean_ms),
            format!("{:.2}", s.median_ms),
            format!("{:.2}", s.std_dev_ms),
            format!("{:.3}", s.success_rate),
        ];
        out.push_str(&fields.join(&sep.to_string()));
        out.push('\n');
    }
    out
}

/// Print the catalog with each resolver's stored health.
pub fn print_catalog(catalog: &Catalog, eligibility: &Eligibility, history: &FailureHistory) {
    println!("DNS resolvers ({} total):\n", catalog.resolvers.len());
    println!("{:<4} {:<24} {:<28} {:<10} {:<8}", "#", "Address", "Description", "Failures", "Status");
    println!("{}", "-".repeat(78));

    for (idx, r) in catalog.resolvers.iter().enumerate() {
        let dropped = eligibility
            .dropped
            .iter()
            .any(|d| d.resolver.address == r.address);
        println!(
            "{:<4} {:<24} {:<28} {:<10} {:<8}",
            idx + 1,
            r.address,
            r.description,
            history.failures(&r.address),
            if dropped { "dropped" } else { "active" }
        );
    }
    println!("\n{} domains in catalog", catalog.domains.len());
}

/// Print the stored failure history.
pub fn print_history(history: &FailureHistory) {
    if history.is_empty() {
        println!("No failure history recorded.");
        return;
    }
    println!("{:<28} {:<10}", "Address", "Failures");
    println!("{}", "-".repeat(40));
    for (address, failures) in history.iter() {
        println!("{:<28} {:<10}", address, failures);
    }
}
