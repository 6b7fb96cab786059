//! Core library for the `stress-test` CLI.
//!
//! The binary spreads a fixed budget of HTTP requests over a pool of
//! concurrent workers and prints one aggregate report. This crate exposes
//! the pieces it is built from: argument and config types, the request
//! executor, report aggregation, and the load coordinator that ties them
//! together.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod sinks;
