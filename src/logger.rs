use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable checked before `RUST_LOG`.
const LOG_ENV: &str = "STRESS_TEST_LOG";

/// Installs the global stderr subscriber. Later calls are ignored.
pub fn init_logging(verbose: bool, no_color: bool) {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| default_filter(verbose),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| default_filter(verbose)),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi(no_color, std::io::stderr().is_terminal()))
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Colors only when stderr is a terminal and they were not disabled.
const fn use_ansi(no_color: bool, stderr_is_terminal: bool) -> bool {
    stderr_is_terminal && !no_color
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}
