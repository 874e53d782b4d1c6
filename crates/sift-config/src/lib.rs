//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by walking up
//! the directory tree from the current working directory, collecting any `.sift.toml` files
//! found, then loading `~/.sift.toml` as the global config with lowest precedence.
//!
//! A configuration describes one catalog deployment: which compiler settings apply, which index
//! fields each filter category searches, and which categories the deployment leaves out.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawCompilerSettings, RawConfig, RawDeployment, RawFieldList, parse_config_file,
    parse_config_str,
};
use serde::Serialize;
use sift_query::{Category, CompilerConfig, FieldCatalog, FilterDefaults};
pub use templates::{global_template, local_template};
use tracing::debug;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for sift.
///
/// This represents the fully resolved configuration after merging all discovered `.sift.toml`
/// files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Query compiler settings.
    pub compiler: CompilerConfig,
    /// Index field overrides per category.
    pub fields: BTreeMap<Category, Vec<String>>,
    /// Facet field overrides per category.
    pub facets: BTreeMap<Category, Vec<String>>,
    /// Categories this deployment offers or leaves out.
    pub deployment: Deployment,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Config files that contributed, highest precedence first.
    pub files: Vec<PathBuf>,
}

/// Deployment-level availability of filter categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployment {
    /// Categories with no default slot; they cannot be set or compiled.
    pub omit: Vec<Category>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// This is the main entry point for loading configuration. It:
    /// 1. Discovers all `.sift.toml` files from `cwd` up to the filesystem root
    /// 2. Appends `~/.sift.toml` if it exists and no root config stopped the walk
    /// 3. Parses each file
    /// 4. Merges them according to precedence rules (closest to `cwd` wins)
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    ///
    /// Returns `Ok(Config::default())` if the list is empty.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                debug!(path = %path.display(), "loading config file");
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Returns the standard field catalog with this configuration's overrides applied.
    pub fn catalog(&self) -> FieldCatalog {
        let mut catalog = FieldCatalog::standard();
        for (category, fields) in &self.fields {
            catalog.set_fields(*category, fields.clone());
        }
        for (category, fields) in &self.facets {
            catalog.set_facets(*category, fields.clone());
        }
        catalog
    }

    /// Returns the standard filter defaults minus the omitted categories.
    pub fn defaults(&self) -> FilterDefaults {
        FilterDefaults::standard().without(&self.deployment.omit)
    }

    /// Returns the filter defaults with the year range ending at `year_max`.
    pub fn defaults_for_year(&self, year_max: i32) -> FilterDefaults {
        FilterDefaults::for_year(year_max).without(&self.deployment.omit)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// This outputs the merged configuration in the same format as a `.sift.toml` file,
    /// making it easy to see the effective configuration.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableConfig {
            compiler: self.compiler,
            fields: named(&self.fields),
            facets: named(&self.facets),
            deployment: SerializableDeployment {
                omit: self.deployment.omit.iter().map(|c| c.as_str()).collect(),
            },
        };
        toml::to_string_pretty(&serializable).expect("settings serialization should not fail")
    }
}

/// Rekeys a category map by wire name.
fn named(map: &BTreeMap<Category, Vec<String>>) -> BTreeMap<&'static str, Vec<String>> {
    map.iter()
        .map(|(category, fields)| (category.as_str(), fields.clone()))
        .collect()
}

/// Effective configuration in `.sift.toml` layout.
#[derive(Serialize)]
struct SerializableConfig {
    /// Compiler settings.
    compiler: CompilerConfig,
    /// Field overrides by category name.
    fields: BTreeMap<&'static str, Vec<String>>,
    /// Facet overrides by category name.
    facets: BTreeMap<&'static str, Vec<String>>,
    /// Deployment section.
    deployment: SerializableDeployment,
}

/// Deployment section with category names.
#[derive(Serialize)]
struct SerializableDeployment {
    /// Omitted category names.
    omit: Vec<&'static str>,
}
