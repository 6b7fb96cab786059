use std::fmt;
use std::time::Duration;

/// Why a counted request did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport error that is neither a timeout nor fatal.
    NetworkError,
    /// The round trip exceeded the configured timeout.
    Timeout,
    /// A response arrived with a status other than 200.
    NonOkStatus { status: u16 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NetworkError => f.write_str("network error"),
            FailureKind::Timeout => f.write_str("timeout"),
            FailureKind::NonOkStatus { status } => write!(f, "status {}", status),
        }
    }
}

/// Normalized result of one request, consumed by a single merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success { status: u16, latency: Duration },
    Failure { kind: FailureKind, latency: Duration },
}

impl RequestOutcome {
    #[must_use]
    pub const fn latency(&self) -> Duration {
        match self {
            RequestOutcome::Success { latency, .. } | RequestOutcome::Failure { latency, .. } => {
                *latency
            }
        }
    }

    /// HTTP status observed for this request, if a response arrived.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status, .. }
            | RequestOutcome::Failure {
                kind: FailureKind::NonOkStatus { status },
                ..
            } => Some(*status),
            RequestOutcome::Failure {
                kind: FailureKind::NetworkError | FailureKind::Timeout,
                ..
            } => None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            RequestOutcome::Failure {
                kind: FailureKind::Timeout,
                ..
            }
        )
    }
}
