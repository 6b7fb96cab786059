mod app;
mod config;
mod http;
mod metrics;
mod run;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use run::RunError;
pub use validation::ValidationError;
