//! Implementation of `sift config`.

use std::process::ExitCode;

use crate::cli::{
    context::CommandContext,
    output::{dim, print_config_warnings},
};

/// Shows effective configuration settings, with the files they came from.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;
    for path in &config.files {
        println!("{}", dim(&format!("# from {}", path.display())));
    }
    print!("{}", config.settings_to_toml());
    print_config_warnings(&config.validate());
    ExitCode::SUCCESS
}
