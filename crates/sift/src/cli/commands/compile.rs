//! Implementation of `sift compile`.

use std::process::ExitCode;

use serde::Serialize;
use sift_query::{Category, CompiledQuery, Encoding, QueryCompiler, Transport};

use crate::cli::{args::CompileCommand, context::CommandContext, output::print_json};

/// JSON output for a compiled query.
#[derive(Serialize)]
struct JsonCompileOutput<'a> {
    /// Category the query was scoped to, if any.
    category: Option<Category>,
    /// The compiled query.
    #[serde(flatten)]
    query: &'a CompiledQuery,
    /// Transport the request would use.
    transport: Transport,
}

/// Compiles a filter state document and prints the query.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let scope = match cmd.category.as_deref().map(str::parse::<Category>).transpose() {
        Ok(scope) => scope,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match ctx.read_state(&cmd.state) {
        Ok(state) => state,
        Err(code) => return code,
    };

    let mut settings = ctx.config.compiler;
    if cmd.raw {
        settings.encoding = Encoding::Raw;
    }
    if cmd.get_only {
        settings.disable_query_posts = true;
    }

    let catalog = ctx.catalog();
    let query = QueryCompiler::new(&catalog, &settings).compile(&state, scope);
    let transport = settings.transport_for(query.text.len());

    if cmd.json {
        return print_json(&JsonCompileOutput {
            category: scope,
            query: &query,
            transport,
        });
    }

    if query.truncated {
        eprintln!("warning: map filter truncated to fit the GET length limit");
    }
    println!("{query}");
    ExitCode::SUCCESS
}
