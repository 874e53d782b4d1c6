//! Terminal styling and JSON serialization for CLI output.

use std::process::ExitCode;

use serde::Serialize;
use sift_config::ConfigWarning;

/// ANSI color codes for terminal output.
mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Yellow text (for warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{}{}{}", colors::BOLD, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Indents every line of `content` by three spaces.
pub fn indent_content(content: &str) -> String {
    content
        .lines()
        .map(|line| format!("   {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints configuration warnings to stderr.
pub fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        eprintln!("{}", warning(&format!("warning: {w}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_prefixes_each_line() {
        assert_eq!(indent_content("a\nb"), "   a\n   b");
    }

    #[test]
    fn styles_wrap_and_reset() {
        assert!(dim("x").ends_with(colors::RESET));
        assert!(subheader("x").starts_with(colors::BOLD));
    }
}
