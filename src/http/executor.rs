use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method, Url};
use tokio::time::Instant;

use crate::config::RunConfig;
use crate::error::HttpError;
use crate::metrics::{FailureKind, RequestOutcome};

use super::client::build_client;

/// The only status counted as success.
const SUCCESS_STATUS: u16 = 200;

/// Issues one request per call.
///
/// `Ok` carries every outcome that is counted in the report, failures
/// included. `Err` is reserved for a target that cannot be reached at all,
/// which aborts the run.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self) -> Result<RequestOutcome, HttpError>;
}

/// [`Executor`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    method: Method,
    url: Url,
}

impl HttpExecutor {
    /// Builds the client for `config` and binds the target method and URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &RunConfig) -> Result<Self, HttpError> {
        Ok(Self::with_client(
            build_client(config)?,
            config.method().clone(),
            config.url().clone(),
        ))
    }

    #[must_use]
    pub const fn with_client(client: Client, method: Method, url: Url) -> Self {
        Self {
            client,
            method,
            url,
        }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self) -> Result<RequestOutcome, HttpError> {
        let start = Instant::now();
        let response = self
            .client
            .request(self.method.clone(), self.url.clone())
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                match drain_response_body(response).await {
                    Ok(_bytes) => Ok(classify_status(status, start.elapsed())),
                    Err(err) => {
                        tracing::debug!("Failed to read response body: {}", err);
                        Ok(RequestOutcome::Failure {
                            kind: body_failure_kind(&err),
                            latency: start.elapsed(),
                        })
                    }
                }
            }
            Err(err) => classify_transport(err, &self.url, start.elapsed()),
        }
    }
}

/// Maps a received status to an outcome: exactly 200 succeeds, anything
/// else is a `NonOkStatus` failure that still carries the code.
#[must_use]
pub const fn classify_status(status: u16, latency: Duration) -> RequestOutcome {
    if status == SUCCESS_STATUS {
        RequestOutcome::Success { status, latency }
    } else {
        RequestOutcome::Failure {
            kind: FailureKind::NonOkStatus { status },
            latency,
        }
    }
}

/// Timeouts win over connect errors, so a connect that runs out the clock is
/// counted rather than aborting the run.
fn classify_transport(
    err: reqwest::Error,
    url: &Url,
    latency: Duration,
) -> Result<RequestOutcome, HttpError> {
    if err.is_timeout() {
        return Ok(RequestOutcome::Failure {
            kind: FailureKind::Timeout,
            latency,
        });
    }
    if err.is_connect() {
        return Err(HttpError::Unreachable {
            url: url.to_string(),
            source: Box::new(err),
        });
    }
    tracing::debug!("Request failed: {}", err);
    Ok(RequestOutcome::Failure {
        kind: FailureKind::NetworkError,
        latency,
    })
}

fn body_failure_kind(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::NetworkError
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
