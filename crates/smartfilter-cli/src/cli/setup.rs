use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(
    name = "smartfilter",
    bin_name = "smartfilter",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Encode, decode, check and run library smart filters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Engine config file (TOML). Overrides ./smartfilter.toml and the global file
    #[arg(short, long, global = true, env = "SMARTFILTER_CONFIG", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// Where a filter comes from.
#[derive(Args, Debug, Clone)]
pub struct FilterInput {
    /// Encoded filter string, or `-` for stdin
    pub filter: String,

    /// Read FILTER as a path to a JSON filter instead of an encoded string
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a JSON filter into its portable string
    Encode {
        /// JSON file holding the filter, or `-` for stdin
        #[arg(default_value = "-")]
        file: String,

        /// Encode without compiling the filter first
        #[arg(long)]
        skip_validation: bool,
    },

    /// Decode a portable string back into a filter
    Decode {
        /// Encoded filter string, or `-` for stdin
        encoded: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Decode and compile a filter, reporting the first problem
    Check {
        #[command(flatten)]
        input: FilterInput,

        /// Fail when statements were dropped during decoding
        #[arg(long)]
        strict: bool,
    },

    /// Run a filter against a JSON export of series rows
    Query {
        #[command(flatten)]
        input: FilterInput,

        /// JSON array of series rows
        #[arg(long)]
        catalog: PathBuf,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = smartfilter::execute::DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Evaluate relative dates as of this RFC 3339 instant
        #[arg(long)]
        now: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List filterable fields and the operators each accepts
    Fields {
        /// Show a single field, by name
        field: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the effective engine configuration
    Config {
        /// Print a commented TOML template instead
        #[arg(long)]
        template: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_takes_json_flag_and_paging() {
        let cli = Cli::parse_from([
            "smartfilter",
            "query",
            "filter.json",
            "--json",
            "--catalog",
            "series.json",
            "--page",
            "2",
            "-f",
            "yaml",
        ]);
        match cli.command {
            Commands::Query {
                input,
                page,
                page_size,
                format,
                ..
            } => {
                assert!(input.json);
                assert_eq!(input.filter, "filter.json");
                assert_eq!(page, 2);
                assert_eq!(page_size, 30);
                assert_eq!(format, OutputFormat::Yaml);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn encode_defaults_to_stdin() {
        let cli = Cli::parse_from(["smartfilter", "encode"]);
        assert!(matches!(cli.command, Commands::Encode { ref file, .. } if file == "-"));
    }
}
