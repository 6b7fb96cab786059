//! Per-request outcomes and their aggregation into a run report.
mod aggregator;
mod histogram;
mod percentage;
mod report;
mod types;


pub use aggregator::ReportAggregator;
pub use histogram::LatencyHistogram;
pub use percentage::Percentage;
pub use report::{Report, ReportSummary};
pub use types::{FailureKind, RequestOutcome};
