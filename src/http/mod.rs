//! Request execution: one HTTP round trip per call, normalized into a
//! [`RequestOutcome`](crate::metrics::RequestOutcome).
mod client;
mod executor;


pub use client::build_client;
pub use executor::{Executor, HttpExecutor, classify_status};
