//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Compile catalog search filters into Solr queries")]
pub struct Cli {
    /// Log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `sift compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Filter state document (JSON object keyed by category, `-` for stdin)
    pub state: PathBuf,

    /// Compile a single category, including its default value
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Leave values unencoded instead of percent-encoding them
    #[arg(long)]
    pub raw: bool,

    /// Only GET requests are possible; truncate long map filters
    #[arg(long)]
    pub get_only: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift facets`.
#[derive(Args, Debug, Clone)]
pub struct FacetsCommand {
    /// Comma-separated facet names or categories [default: standard facets]
    #[arg(long)]
    pub fields: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `sift filters`.
#[derive(Args, Debug, Clone)]
pub struct FiltersCommand {
    /// Filter state document (JSON object keyed by category, `-` for stdin)
    pub state: PathBuf,
}

/// Arguments for `sift init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.sift.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a filter state document into a query string
    #[command(after_help = "\
STATE DOCUMENTS:
  Keys are filter categories; unknown keys are ignored.

  {\"all\": [\"salmon\"], \"creator\": [\"Kibele\"]}
  {\"pubYear\": true, \"yearMin\": 1990, \"yearMax\": 2000}
  {\"useGeohash\": true, \"geohashes\": [\"9q8yy\", \"9q8yz\"]}

EXAMPLES:
  sift compile state.json
  sift compile state.json --raw
  sift compile state.json --category formatType
  echo '{\"all\": [\"soil\"]}' | sift compile -")]
    Compile(CompileCommand),

    /// Print facet request parameters
    Facets(FacetsCommand),

    /// List the active filters in a state document
    Filters(FiltersCommand),

    /// Show effective configuration settings
    Config,

    /// Initialize sift configuration in current directory
    Init(InitCommand),
}
