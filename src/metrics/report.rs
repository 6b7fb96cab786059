use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::percentage::Percentage;
use super::types::RequestOutcome;

/// Running counters for one load run.
///
/// Every update in [`Report::merge`] is a sum, min or max, so the final
/// state does not depend on the order outcomes arrive in. `succeeded +
/// failed == total_requests` holds after every merge.
#[derive(Debug, Clone)]
pub struct Report {
    total_requests: u64,
    succeeded: u64,
    failed: u64,
    timed_out: u64,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
    latency_sum: Duration,
    status_counts: BTreeMap<u16, u64>,
    histogram: LatencyHistogram,
}

impl Report {
    /// Creates an empty report.
    ///
    /// # Errors
    ///
    /// Returns an error if the latency histogram cannot be allocated.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            total_requests: 0,
            succeeded: 0,
            failed: 0,
            timed_out: 0,
            fastest: None,
            slowest: None,
            latency_sum: Duration::ZERO,
            status_counts: BTreeMap::new(),
            histogram: LatencyHistogram::new()?,
        })
    }

    /// Folds one outcome into the counters.
    pub fn merge(&mut self, outcome: &RequestOutcome) {
        self.total_requests = self.total_requests.saturating_add(1);
        if outcome.is_success() {
            self.succeeded = self.succeeded.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
            if outcome.is_timeout() {
                self.timed_out = self.timed_out.saturating_add(1);
            }
        }
        if let Some(status) = outcome.status() {
            let count = self.status_counts.entry(status).or_insert(0);
            *count = count.saturating_add(1);
        }

        let latency = outcome.latency();
        self.fastest = Some(self.fastest.map_or(latency, |fastest| fastest.min(latency)));
        self.slowest = Some(self.slowest.map_or(latency, |slowest| slowest.max(latency)));
        self.latency_sum = self.latency_sum.saturating_add(latency);
        self.histogram.record(latency);
    }

    /// Derives averages and percentages. `total_time` is the wall-clock span
    /// of the run.
    #[must_use]
    pub fn summarize(&self, total_time: Duration) -> ReportSummary {
        let (p50, p90, p99) = self
            .histogram
            .percentiles()
            .map_or((None, None, None), |(p50, p90, p99)| {
                (Some(p50), Some(p90), Some(p99))
            });

        ReportSummary {
            total_time,
            total_requests: self.total_requests,
            succeeded: self.succeeded,
            failed: self.failed,
            timed_out: self.timed_out,
            fastest: self.fastest,
            slowest: self.slowest,
            average: average_latency(self.latency_sum, self.total_requests),
            p50,
            p90,
            p99,
            percentage_succeeded: Percentage::of(self.succeeded, self.total_requests),
            percentage_failed: Percentage::of(self.failed, self.total_requests),
            percentage_timed_out: Percentage::of(self.timed_out, self.total_requests),
            status_counts: self.status_counts.clone(),
            interrupted: false,
        }
    }

    #[must_use]
    pub const fn total_requests(&self) -> u64 {
        self.total_requests
    }

    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.succeeded
    }

    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    #[must_use]
    pub const fn timed_out(&self) -> u64 {
        self.timed_out
    }

    #[must_use]
    pub const fn fastest(&self) -> Option<Duration> {
        self.fastest
    }

    #[must_use]
    pub const fn slowest(&self) -> Option<Duration> {
        self.slowest
    }

    #[must_use]
    pub const fn latency_sum(&self) -> Duration {
        self.latency_sum
    }

    #[must_use]
    pub const fn status_counts(&self) -> &BTreeMap<u16, u64> {
        &self.status_counts
    }
}

/// `sum / count`, or `None` for an empty run.
fn average_latency(sum: Duration, count: u64) -> Option<Duration> {
    let nanos = sum.as_nanos().checked_div(u128::from(count))?;
    Some(Duration::from_nanos(
        u64::try_from(nanos).unwrap_or(u64::MAX),
    ))
}

/// Final statistics of a completed run.
///
/// Durations serialize as integer microseconds and percentages as
/// hundredths of a percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    #[serde(rename = "total_time_us", serialize_with = "serialize_micros")]
    pub total_time: Duration,
    pub total_requests: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    #[serde(rename = "fastest_us", serialize_with = "serialize_opt_micros")]
    pub fastest: Option<Duration>,
    #[serde(rename = "slowest_us", serialize_with = "serialize_opt_micros")]
    pub slowest: Option<Duration>,
    #[serde(rename = "average_us", serialize_with = "serialize_opt_micros")]
    pub average: Option<Duration>,
    #[serde(rename = "p50_us", serialize_with = "serialize_opt_micros")]
    pub p50: Option<Duration>,
    #[serde(rename = "p90_us", serialize_with = "serialize_opt_micros")]
    pub p90: Option<Duration>,
    #[serde(rename = "p99_us", serialize_with = "serialize_opt_micros")]
    pub p99: Option<Duration>,
    #[serde(rename = "percentage_succeeded_x100")]
    pub percentage_succeeded: Percentage,
    #[serde(rename = "percentage_failed_x100")]
    pub percentage_failed: Percentage,
    #[serde(rename = "percentage_timed_out_x100")]
    pub percentage_timed_out: Percentage,
    pub status_counts: BTreeMap<u16, u64>,
    pub interrupted: bool,
}

fn serialize_micros<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_micros()).unwrap_or(u64::MAX))
}

fn serialize_opt_micros<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serialize_micros(duration, serializer),
        None => serializer.serialize_none(),
    }
}
