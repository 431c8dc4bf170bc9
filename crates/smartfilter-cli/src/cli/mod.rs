//! # CLI Behavior
//!
//! One possible client of the filter engine. It works on files and strings,
//! never on a live catalog database:
//!
//! - `smartfilter encode filter.json` reads a filter as JSON and prints its
//!   portable string.
//! - `smartfilter decode <STRING>` prints the filter back, plus any
//!   statements the running catalog could not represent.
//! - `smartfilter check <STRING>` decodes and compiles, exiting non-zero on
//!   the first problem.
//! - `smartfilter query <STRING> --catalog series.json` runs a filter against
//!   a JSON export of series rows and prints one page.
//! - `smartfilter fields` lists filterable fields and their operators.
//! - `smartfilter config` shows the effective engine configuration.
//!
//! A `-` in place of a file or string reads it from stdin.
//!
//! ## Logging
//!
//! Logs go to stderr through `tracing-subscriber`. The filter comes from
//! `SMARTFILTER_LOG`, then `RUST_LOG`, then defaults to warnings only
//! (`--verbose` raises it to debug). Dropped statements are logged as
//! warnings, so stdout stays machine-readable.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `commands`: context setup and dispatch
//! - `handlers`: per-command logic
//! - `render`: output formatting

mod commands;
mod handlers;
mod render;
pub mod setup;

pub use commands::run;
