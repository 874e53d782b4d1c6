//! Implementation of `sift filters`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use sift_query::{FieldCatalog, FilterSlot, FilterState};

use crate::cli::{
    args::FiltersCommand,
    context::CommandContext,
    output::{dim, subheader},
};

/// Lists the active filters of a state document with their index fields.
pub fn run(ctx: &CommandContext, cmd: &FiltersCommand) -> ExitCode {
    let state = match ctx.read_state(&cmd.state) {
        Ok(state) => state,
        Err(code) => return code,
    };

    let count = state.filter_count();
    if count == 0 {
        println!("{}", dim("No active filters."));
        return ExitCode::SUCCESS;
    }

    let catalog = ctx.catalog();
    println!("{}", subheader(&format!("Active filters ({count}):")));
    println!("{}", filter_table(&state, &catalog));
    ExitCode::SUCCESS
}

/// Builds a table row per current filter.
fn filter_table(state: &FilterState, catalog: &FieldCatalog) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Category", "Label", "Fields", "Value"]);

    for category in state.current_filters() {
        let value = state.get(category).map(describe).unwrap_or_default();
        table.add_row(vec![
            Cell::new(category.as_str()),
            Cell::new(catalog.label(category)),
            Cell::new(catalog.fields(category).join(", ")),
            Cell::new(value),
        ]);
    }
    table
}

/// Renders a slot for display.
fn describe(slot: &FilterSlot) -> String {
    match slot {
        FilterSlot::Null => String::from("-"),
        FilterSlot::Flag(flag) => flag.to_string(),
        FilterSlot::Number(n) => n.to_string(),
        FilterSlot::Text(text) => text.clone(),
        FilterSlot::Values(values) => values
            .iter()
            .map(|v| v.value())
            .collect::<Vec<_>>()
            .join(", "),
        FilterSlot::Exclusions(exclusions) => exclusions
            .iter()
            .map(|e| format!("-{}:{}", e.field, e.value))
            .collect::<Vec<_>>()
            .join(" "),
        FilterSlot::Groups(groups) => groups.keys().join(", "),
    }
}
