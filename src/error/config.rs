use super::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Config '{field}' must be >= 1: {source}")]
    FieldMustBePositive {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid config '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("URL '{url}' is missing host.")]
    UrlMissingHost { url: String },
    #[error("Invalid HTTP method '{method}'.")]
    InvalidMethod { method: String },
    #[error("Concurrency must be >= 1.")]
    ZeroConcurrency,
    #[error("Requests must be >= 1.")]
    ZeroRequests,
    #[error("Timeout must be > 0.")]
    ZeroTimeout,
}
