use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

use reqwest::{Method, Url};

use crate::args::TesterArgs;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

/// Immutable parameters of one load run.
///
/// Built once from the merged CLI/config input and validated up front, so a
/// bad value never reaches a worker.
#[derive(Debug, Clone)]
pub struct RunConfig {
    url: Url,
    method: Method,
    concurrency: NonZeroUsize,
    requests: NonZeroU64,
    timeout: Duration,
    verify_tls: bool,
    verbose: bool,
}

impl RunConfig {
    /// Validates and builds a run configuration. TLS verification is on and
    /// verbose output off until changed with the `with_*` methods.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the URL is malformed or not http(s),
    /// the method is not a valid token, or any count or the timeout is zero.
    pub fn new(
        url: &str,
        method: &str,
        concurrency: usize,
        requests: u64,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let url = parse_target_url(url)?;
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).map_err(
            |_err| ConfigError::InvalidMethod {
                method: method.to_owned(),
            },
        )?;
        let concurrency = NonZeroUsize::new(concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        let requests = NonZeroU64::new(requests).ok_or(ConfigError::ZeroRequests)?;
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            url,
            method,
            concurrency,
            requests,
            timeout,
            verify_tls: true,
            verbose: false,
        })
    }

    /// Builds the run configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when no URL was given or a value fails validation.
    pub fn from_args(args: &TesterArgs) -> AppResult<Self> {
        let url = args
            .url
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
        let config = Self::new(
            url,
            args.method.as_str(),
            args.concurrency.get(),
            args.requests.get(),
            args.request_timeout,
        )?;
        Ok(config
            .with_verify_tls(!args.insecure)
            .with_verbose(args.verbose))
    }

    #[must_use]
    pub const fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests.get()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::UrlMissingHost {
            url: raw.to_owned(),
        });
    }
    Ok(url)
}
