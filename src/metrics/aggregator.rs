use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::report::{Report, ReportSummary};
use super::types::RequestOutcome;

/// The single shared [`Report`] of a run, mutated only through [`merge`].
///
/// The lock covers the constant-time counter update and nothing else; it is
/// never held across an `.await`.
///
/// [`merge`]: ReportAggregator::merge
#[derive(Debug)]
pub struct ReportAggregator {
    report: Mutex<Report>,
}

impl ReportAggregator {
    #[must_use]
    pub const fn new(report: Report) -> Self {
        Self {
            report: Mutex::new(report),
        }
    }

    pub fn merge(&self, outcome: &RequestOutcome) {
        self.lock().merge(outcome);
    }

    #[must_use]
    pub fn summarize(&self, total_time: Duration) -> ReportSummary {
        self.lock().summarize(total_time)
    }

    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Poisoned locks are recovered: a merge has no partial state that matters.
    fn lock(&self) -> MutexGuard<'_, Report> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
