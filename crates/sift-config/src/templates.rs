//! Configuration templates for `sift init`.
//!
//! Both templates are valid `.sift.toml` files. They are written out commented,
//! so a fresh file documents every setting without changing any defaults.

/// Local catalog configuration template.
const LOCAL_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Global configuration template.
const GLOBAL_TEMPLATE: &str = include_str!("../templates/config-global.toml");

/// Returns the local configuration template as a commented-out example.
pub fn local_template() -> String {
    comment_out(LOCAL_TEMPLATE)
}

/// Returns the global configuration template as a commented-out example.
pub fn global_template() -> String {
    comment_out(GLOBAL_TEMPLATE)
}

/// Prefixes every setting line with `# `; comments and blank lines pass through.
fn comment_out(template: &str) -> String {
    template
        .lines()
        .map(|line| {
            if line.is_empty() || line.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}
