use clap::Parser;
use reqwest::Method;
use std::time::Duration;

use super::defaults::{DEFAULT_CONCURRENCY, DEFAULT_METHOD, DEFAULT_REQUESTS, DEFAULT_TIMEOUT};
use super::parsers::{parse_bool_env, parse_duration_arg, parse_method, parse_positive_u64, parse_positive_usize};
use super::types::{OutputFormat, PositiveU64, PositiveUsize, TimeUnit};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Fixed-budget HTTP load generator: spreads N requests over C concurrent workers and reports latency and status-code statistics."
)]
pub struct TesterArgs {
    /// Target URL for the stress test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short, default_value = DEFAULT_METHOD, value_parser = parse_method)]
    pub method: Method,

    /// Number of concurrent workers
    #[arg(
        long,
        short,
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Total number of requests to issue across all workers
    #[arg(
        long,
        short,
        default_value = DEFAULT_REQUESTS,
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Per-request timeout (seconds, or with ms/s/m/h suffix)
    #[arg(
        long = "timeout",
        short = 't',
        default_value = DEFAULT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Skip TLS certificate and hostname verification
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// Print one status line per request and enable debug logging (unless overridden by STRESS_TEST_LOG/RUST_LOG)
    #[arg(long, short)]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./stress-test.toml or ./stress-test.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Report format written to stdout
    #[arg(long = "output-format", short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Latency unit used in the text report
    #[arg(long = "time-unit", value_enum, default_value_t = TimeUnit::Ms)]
    pub time_unit: TimeUnit,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
