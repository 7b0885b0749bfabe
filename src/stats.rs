//! Statistics aggregation.
//!
//! Reduces a resolver's run into summary statistics over its successful
//! response times. All times are in milliseconds.

use crate::dns::types::RunResult;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Summary of one resolver's run. Derived every run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    /// Sample standard deviation; 0 with fewer than two samples
    pub std_dev_ms: f64,
    /// Successful probes over total probes
    pub success_rate: f64,
    pub successful_queries: usize,
    pub total_queries: usize,
    pub computed_at: DateTime<Local>,
}

impl RunStatistics {
    /// Whether at least one probe produced a response time.
    #[must_use]
    pub fn has_measurements(&self) -> bool {
        self.successful_queries > 0
    }
}

/// Summarize a run.
///
/// With no successful probes every numeric field is zero and
/// `total_queries` still reports the run length.
#[must_use]
pub fn summarize(run: &RunResult) -> RunStatistics {
    let mut times = run.response_times_ms();
    let total_queries = run.len();

    if times.is_empty() {
        return RunStatistics {
            min_ms: 0.0,
            max_ms: 0.0,
            mean_ms: 0.0,
            median_ms: 0.0,
            std_dev_ms: 0.0,
            success_rate: 0.0,
            successful_queries: 0,
            total_queries,
            computed_at: Local::now(),
        };
    }

    times.sort_by(f64::total_cmp);
    let count = times.len();

    RunStatistics {
        min_ms: times[0],
        max_ms: times[count - 1],
        mean_ms: mean(&times),
        median_ms: median(&times),
        std_dev_ms: sample_std_dev(&times),
        success_rate: count as f64 / total_queries as f64,
        successful_queries: count,
        total_queries,
        computed_at: Local::now(),
    }
}

/// Order entries by ascending mean response time, dropping entries without
/// any measurement.
pub fn rank<T, F>(entries: &[T], stats: F) -> Vec<&T>
where
    F: Fn(&T) -> &RunStatistics,
{
    let mut ranked: Vec<&T> = entries
        .iter()
        .filter(|e| stats(*e).has_measurements())
        .collect();
    ranked.sort_by(|a, b| stats(*a).mean_ms.total_cmp(&stats(*b).mean_ms));
    ranked
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of sorted, non-empty values; mean of the middle pair when even.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
