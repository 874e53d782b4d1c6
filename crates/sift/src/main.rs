//! sift: faceted catalog search from the command line.
//!
//! sift turns the filters chosen in a catalog search session, stored as a JSON
//! filter-state document, into the Lucene/Solr `q` parameter sent to the index.
//! Index field names and deployment settings come from `.sift.toml` files.

mod cli;

use std::{io, process::ExitCode};

use clap::Parser;
use cli::{
    CommandContext,
    args::{Cli, Commands},
    commands,
};
use tracing::Level;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = match cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    match ctx {
        Ok(ctx) => commands::run(cli.command, &ctx),
        Err(code) => code,
    }
}

/// Installs a stderr log subscriber; each `-v` raises the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();
}
