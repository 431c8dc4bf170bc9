//! # CLI Layer
//!
//! The only place that touches the terminal: it parses arguments, installs
//! the log subscriber, loads configuration, reads inputs and prints what the
//! handlers return.

use super::handlers::{self, Api};
use super::setup::{Cli, Commands, FilterInput};
use anyhow::{Context, Result};
use clap::Parser;
use smartfilter::config::EngineConfig;
use smartfilter::execute::PageRequest;
use smartfilter::smart_filter::InMemorySmartFilterStore;
use smartfilter::FilterApi;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "loaded engine configuration");
    let api: Api = FilterApi::new(InMemorySmartFilterStore::new(), config);

    let output = match cli.command {
        Commands::Encode {
            file,
            skip_validation,
        } => handlers::encode(&api, &read_file(&file)?, skip_validation)?,
        Commands::Decode { encoded, format } => handlers::decode(&api, &read_arg(&encoded)?, format)?,
        Commands::Check { input, strict } => {
            let loaded = load(&api, &input)?;
            handlers::check(&api, &loaded, strict)?
        }
        Commands::Query {
            input,
            catalog,
            page,
            page_size,
            now,
            format,
        } => {
            let loaded = load(&api, &input)?;
            let rows = std::fs::read_to_string(&catalog)
                .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
            let now = handlers::parse_now(now.as_deref())?;
            handlers::query(&api, &loaded, &rows, PageRequest::new(page, page_size), now, format)?
        }
        Commands::Fields { field, format } => handlers::fields(field.as_deref(), format)?,
        Commands::Config { template } => handlers::config(api.config(), template)?,
    };
    print!("{}", output);
    Ok(())
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SMARTFILTER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            EnvFilter::new(if verbose {
                "smartfilter=debug,smartfilter_cli=debug"
            } else {
                "warn"
            })
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(api: &Api, input: &FilterInput) -> Result<handlers::LoadedFilter> {
    let text = if input.json {
        read_file(&input.filter)?
    } else {
        read_arg(&input.filter)?
    };
    handlers::load_filter(api, &text, input.json)
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

/// A literal argument, or stdin for `-`.
fn read_arg(arg: &str) -> Result<String> {
    if arg == "-" {
        return Ok(read_stdin()?.trim().to_string());
    }
    Ok(arg.to_string())
}

/// A file's contents, or stdin for `-`.
fn read_file(path: &str) -> Result<String> {
    if path == "-" {
        return read_stdin();
    }
    std::fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {}", path))
}
