use std::time::Duration;

use hdrhistogram::Histogram;
use tracing::warn;

use crate::error::MetricsError;

/// Significant decimal digits kept by the histogram.
const SIGNIFICANT_DIGITS: u8 = 3;

/// Latency distribution at microsecond resolution.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new auto-resizing latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(SIGNIFICANT_DIGITS)
            .map_err(|err| MetricsError::Histogram { source: err })?;
        Ok(Self { hist })
    }

    /// Record one latency. Sub-microsecond values count as 1µs.
    ///
    /// The histogram grows to fit the value; a value it cannot hold is
    /// dropped from the percentiles with a warning, while the report's
    /// counters still include it.
    pub fn record(&mut self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        if let Err(err) = self.hist.record(micros.max(1)) {
            warn!(latency_us = micros, "Failed to record latency: {}", err);
        }
    }

    /// p50/p90/p99, or `None` when nothing was recorded.
    #[must_use]
    pub fn percentiles(&self) -> Option<(Duration, Duration, Duration)> {
        if self.count() == 0 {
            return None;
        }

        Some((
            Duration::from_micros(self.hist.value_at_quantile(0.5)),
            Duration::from_micros(self.hist.value_at_quantile(0.9)),
            Duration::from_micros(self.hist.value_at_quantile(0.99)),
        ))
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
