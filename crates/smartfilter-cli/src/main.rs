//! # Smartfilter CLI
//!
//! A thin binary over the `smartfilter` library: this file only invokes
//! `cli::run()` and turns an error into exit status 1. Everything that knows
//! about arguments, stdin, stdout and log output lives in `src/cli/`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - context wiring + dispatch (commands.rs)                  │
//! │  - per-command logic over FilterApi (handlers.rs)           │
//! │  - text / JSON / YAML output (render.rs)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  smartfilter::FilterApi                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers return the text to print instead of printing it, so they are
//! unit-tested without a terminal. `tests/cli_e2e.rs` drives the real binary.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
