use std::sync::Arc;

use tracing::info;

use crate::metrics::RequestOutcome;

/// Receives every outcome after it has been merged into the shared report.
///
/// Implementations are called concurrently from all workers and must not
/// block for long.
pub trait OutcomeSink: Send + Sync {
    fn on_outcome(&self, worker: usize, outcome: &RequestOutcome);
}

/// Discards outcomes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutcomeSink for NullSink {
    fn on_outcome(&self, _worker: usize, _outcome: &RequestOutcome) {}
}

/// Emits one log line per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn on_outcome(&self, worker: usize, outcome: &RequestOutcome) {
        let latency_us = u64::try_from(outcome.latency().as_micros()).unwrap_or(u64::MAX);
        match outcome {
            RequestOutcome::Success { status, .. } => {
                info!(worker, status, latency_us, "request succeeded");
            }
            RequestOutcome::Failure { kind, .. } => {
                info!(worker, %kind, latency_us, "request failed");
            }
        }
    }
}

/// Sink used by the CLI: per-request lines only in verbose mode.
#[must_use]
pub fn sink_for(verbose: bool) -> Arc<dyn OutcomeSink> {
    if verbose {
        Arc::new(TracingSink)
    } else {
        Arc::new(NullSink)
    }
}
