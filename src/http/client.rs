use reqwest::Client;
use tracing::{debug, warn};

use crate::args::DEFAULT_USER_AGENT;
use crate::config::RunConfig;
use crate::error::HttpError;

/// Builds the client shared by all workers.
///
/// The configured timeout bounds the whole round trip: connect, request,
/// response headers and body.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialized.
pub fn build_client(config: &RunConfig) -> Result<Client, HttpError> {
    let mut builder = Client::builder()
        .timeout(config.timeout())
        .user_agent(DEFAULT_USER_AGENT);

    if !config.verify_tls() {
        warn!("TLS certificate verification is disabled.");
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    let client = builder
        .build()
        .map_err(|err| HttpError::BuildClient { source: err })?;
    debug!(
        timeout_ms = u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX),
        verify_tls = config.verify_tls(),
        "HTTP client ready"
    );
    Ok(client)
}
