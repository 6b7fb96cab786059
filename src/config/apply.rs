use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, TesterArgs, parse_method};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. A config value is used
/// only when the matching flag was not given on the command line.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.as_ref()
    {
        args.url = Some(url.clone());
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method.as_deref()
    {
        args.method = parse_method(method).map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "method",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = ensure_positive_usize(concurrency, "concurrency")?;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "timeout",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "time_unit")
        && let Some(unit) = config.time_unit
    {
        args.time_unit = unit;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &'static str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}
