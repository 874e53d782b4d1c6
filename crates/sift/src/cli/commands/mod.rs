//! Command implementations and dispatch.

pub mod compile;
pub mod config;
pub mod facets;
pub mod filters;
pub mod init;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Compile(cmd) => compile::run(ctx, &cmd),
        Commands::Facets(cmd) => facets::run(ctx, &cmd),
        Commands::Filters(cmd) => filters::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
        Commands::Init(cmd) => init::run(ctx, &cmd),
    }
}
