pub(crate) const DEFAULT_USER_AGENT: &str = concat!("stress-test/", env!("CARGO_PKG_VERSION"));

/// Config filenames checked in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["stress-test.toml", "stress-test.json"];

pub(super) const DEFAULT_METHOD: &str = "GET";
pub(super) const DEFAULT_CONCURRENCY: &str = "1";
pub(super) const DEFAULT_REQUESTS: &str = "1";
pub(super) const DEFAULT_TIMEOUT: &str = "10";
