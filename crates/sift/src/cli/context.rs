//! Shared context for running CLI commands.

use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use serde_json::Value;
use sift_config::Config;
use sift_query::{FieldCatalog, FilterState};
use tracing::debug;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns the field catalog for this configuration.
    pub fn catalog(&self) -> FieldCatalog {
        self.config.catalog()
    }

    /// Reads a filter state document, exiting with an error on failure.
    ///
    /// A path of `-` reads the document from stdin.
    pub fn read_state(&self, path: &Path) -> Result<FilterState, ExitCode> {
        let contents = read_document(path).map_err(|e| {
            eprintln!("error: failed to read {}: {e}", path.display());
            ExitCode::FAILURE
        })?;
        let document: Value = serde_json::from_str(&contents).map_err(|e| {
            eprintln!("error: {} is not valid JSON: {e}", path.display());
            ExitCode::FAILURE
        })?;
        debug!(path = %path.display(), "loaded filter state");
        FilterState::from_json(self.config.defaults(), document).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }
}

/// Reads a file, or stdin for `-`.
fn read_document(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut contents = String::new();
        io::stdin().read_to_string(&mut contents)?;
        Ok(contents)
    } else {
        fs::read_to_string(path)
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
