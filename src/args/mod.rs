//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::TesterArgs;
pub use types::{OutputFormat, PositiveU64, PositiveUsize, TimeUnit};

pub(crate) use defaults::{DEFAULT_CONFIG_FILES, DEFAULT_USER_AGENT};
pub(crate) use parsers::{parse_duration_arg, parse_method};
