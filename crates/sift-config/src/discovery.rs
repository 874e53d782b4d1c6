//! Locating `.sift.toml` files.
//!
//! Files are collected from the working directory upwards. A file with
//! `root = true` ends the walk; otherwise `~/.sift.toml` is added last.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sift.toml";

/// Returns every config file that applies to `cwd`, closest first.
///
/// The global file comes last, and only when no root config was reached.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let is_root = is_root_config(&candidate);
        configs.push(candidate);
        if is_root {
            debug!(files = configs.len(), "config discovery stopped at root config");
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }

    debug!(files = configs.len(), "discovered config files");
    configs
}

/// Returns the path of `~/.sift.toml`, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Returns true when `path` is the global config file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
