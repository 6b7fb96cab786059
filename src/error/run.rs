use thiserror::Error;

use super::{HttpError, MetricsError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run aborted: {0}")]
    Fatal(#[from] HttpError),
    #[error("Failed to prepare report: {0}")]
    Metrics(#[from] MetricsError),
    #[error("Run was already started.")]
    AlreadyStarted,
    #[error("Worker task failed: {source}")]
    Worker {
        #[from]
        source: tokio::task::JoinError,
    },
}
