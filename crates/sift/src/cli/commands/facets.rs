//! Implementation of `sift facets`.

use std::process::ExitCode;

use serde::Serialize;
use sift_query::build_facet_params;

use crate::cli::{args::FacetsCommand, context::CommandContext, output::print_json};

/// JSON output for facet parameters.
#[derive(Serialize)]
struct JsonFacetOutput<'a> {
    /// Every request parameter in order.
    params: Vec<(&'a str, &'a str)>,
    /// The facet fields alone.
    fields: &'a [String],
}

/// Prints the facet parameters for the configured catalog.
pub fn run(ctx: &CommandContext, cmd: &FacetsCommand) -> ExitCode {
    let catalog = ctx.catalog();
    let defaults = ctx.config.defaults();
    let params = build_facet_params(&catalog, &defaults, cmd.fields.as_deref());

    if params.fields.is_empty() {
        eprintln!("error: no facet fields requested");
        return ExitCode::FAILURE;
    }

    if cmd.json {
        return print_json(&JsonFacetOutput {
            params: params.pairs(),
            fields: &params.fields,
        });
    }

    println!("{}", params.to_query_string());
    ExitCode::SUCCESS
}
