use std::time::Duration;

use reqwest::Method;

use super::types::{PositiveU64, PositiveUsize};
use crate::error::ValidationError;

/// Seconds per minute.
const SECS_PER_MIN: u64 = 60;
/// Seconds per hour.
const SECS_PER_HOUR: u64 = 3_600;

pub(super) fn parse_positive_u64(s: &str) -> Result<PositiveU64, ValidationError> {
    s.parse::<PositiveU64>()
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

/// Boolean as commonly written in environment variables (`NO_COLOR=1`).
pub(super) fn parse_bool_env(s: &str) -> Result<bool, ValidationError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        }),
    }
}

/// Parses an HTTP verb. Any RFC 7230 token is accepted and upper-cased, so
/// `get` and `GET` name the same method.
pub(crate) fn parse_method(s: &str) -> Result<Method, ValidationError> {
    let normalized = s.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(ValidationError::InvalidMethod {
            value: s.to_owned(),
        });
    }
    Method::from_bytes(normalized.as_bytes()).map_err(|_err| ValidationError::InvalidMethod {
        value: s.to_owned(),
    })
}

/// Parses a timeout. A bare number is seconds; `ms`, `s`, `m` and `h`
/// suffixes are accepted.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(
            number
                .checked_mul(SECS_PER_MIN)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        "h" => Duration::from_secs(
            number
                .checked_mul(SECS_PER_HOUR)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
