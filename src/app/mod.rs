//! Load coordination and report rendering.
mod partition;
mod runner;
mod summary;

#[cfg(test)]
mod tests;

pub use partition::partition;
pub use runner::{LoadCoordinator, RunState};
pub use summary::{print_report, render_json, summary_lines};
