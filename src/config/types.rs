use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, TimeUnit, parse_duration_arg};
use crate::error::ValidationError;

/// File-level defaults. Every key is optional; flags given on the command
/// line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<String>,
    pub concurrency: Option<usize>,
    pub requests: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub insecure: Option<bool>,
    pub verbose: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub time_unit: Option<TimeUnit>,
}

/// A duration given either as whole seconds or as a suffixed string
/// (`"500ms"`, `"2s"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
