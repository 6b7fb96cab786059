use std::time::Duration;

use serde::Serialize;

use crate::args::{OutputFormat, TimeUnit};
use crate::config::RunConfig;
use crate::metrics::ReportSummary;

/// Microseconds per millisecond.
const US_PER_MS: u32 = 1_000;
/// Placeholder for statistics that are undefined on an empty run.
const UNDEFINED: &str = "n/a";

#[derive(Serialize)]
struct JsonReport<'report> {
    url: &'report str,
    method: &'report str,
    concurrency: usize,
    requests: u64,
    #[serde(flatten)]
    summary: &'report ReportSummary,
}

/// Human-readable report, one line per entry.
#[must_use]
pub fn summary_lines(config: &RunConfig, summary: &ReportSummary, unit: TimeUnit) -> Vec<String> {
    let mut lines = vec![
        "Report:".to_owned(),
        format!("Target: {} {}", config.method(), config.url()),
        format!("Concurrency: {}", config.concurrency()),
        format!("Total Time: {}", format_duration(summary.total_time, unit)),
        format!("Requests: {}", summary.total_requests),
        format!(
            "Succeeded: {} ({})",
            summary.succeeded, summary.percentage_succeeded
        ),
        format!("Failed: {} ({})", summary.failed, summary.percentage_failed),
        format!(
            "Timed Out: {} ({})",
            summary.timed_out, summary.percentage_timed_out
        ),
        format!("Fastest: {}", format_optional(summary.fastest, unit)),
        format!("Slowest: {}", format_optional(summary.slowest, unit)),
        format!("Average: {}", format_optional(summary.average, unit)),
        format!(
            "P50/P90/P99: {} / {} / {}",
            format_optional(summary.p50, unit),
            format_optional(summary.p90, unit),
            format_optional(summary.p99, unit)
        ),
    ];

    if summary.interrupted {
        lines.push(format!(
            "Interrupted: {} of {} requests issued",
            summary.total_requests,
            config.requests()
        ));
    }

    lines.extend(
        summary
            .status_counts
            .iter()
            .map(|(status, count)| format!("Status {}: {}", status, count)),
    );
    lines
}

/// JSON report including the run parameters.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(config: &RunConfig, summary: &ReportSummary) -> Result<String, serde_json::Error> {
    let url = config.url().as_str();
    serde_json::to_string_pretty(&JsonReport {
        url,
        method: config.method().as_str(),
        concurrency: config.concurrency(),
        requests: config.requests(),
        summary,
    })
}

/// Writes the report to stdout in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_report(
    config: &RunConfig,
    summary: &ReportSummary,
    format: OutputFormat,
    unit: TimeUnit,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(config, summary, unit) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            println!("{}", render_json(config, summary)?);
        }
    }
    Ok(())
}

fn format_optional(value: Option<Duration>, unit: TimeUnit) -> String {
    value.map_or_else(|| UNDEFINED.to_owned(), |duration| format_duration(duration, unit))
}

pub(super) fn format_duration(value: Duration, unit: TimeUnit) -> String {
    match unit {
        TimeUnit::S => format!("{}.{:03}s", value.as_secs(), value.subsec_millis()),
        TimeUnit::Ms => format!(
            "{}.{:03}ms",
            value.as_millis(),
            value.subsec_micros() % US_PER_MS
        ),
    }
}
