//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use sift_query::Category;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No `.sift.toml` was found, so built-in defaults apply.
    NoConfigFiles,
    /// A field override maps a category to no fields.
    EmptyFieldList {
        /// Section containing the override.
        section: &'static str,
        /// Category with the empty list.
        category: Category,
    },
    /// A category is both omitted and given field overrides.
    OmittedCategoryConfigured {
        /// The omitted category.
        category: Category,
    },
    /// The map filter is enabled but the index has no geohash cells.
    SpatialWithoutGeohashes,
    /// Truncation starts past the point where GET requests already fail.
    GeohashLimitAboveUrlLimit {
        /// Configured geohash query limit.
        geohash_query_limit: usize,
        /// Configured URL length limit.
        url_length_limit: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfigFiles => {
                write!(f, "no .sift.toml found, using built-in defaults")
            }
            Self::EmptyFieldList { section, category } => {
                write!(f, "[{section}] maps '{category}' to no fields")
            }
            Self::OmittedCategoryConfigured { category } => {
                write!(f, "'{category}' is omitted from the deployment but has field overrides")
            }
            Self::SpatialWithoutGeohashes => {
                write!(f, "spatial_enabled is set but 'geohashes' is omitted from the deployment")
            }
            Self::GeohashLimitAboveUrlLimit {
                geohash_query_limit,
                url_length_limit,
            } => write!(
                f,
                "geohash_query_limit ({geohash_query_limit}) exceeds url_length_limit ({url_length_limit})"
            ),
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// This checks for:
/// - Missing configuration files
/// - Field or facet overrides with no fields
/// - Omitted categories that still carry overrides
/// - Compiler settings that contradict the deployment
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.files.is_empty() {
        warnings.push(ConfigWarning::NoConfigFiles);
    }

    for (section, map) in [("fields", &config.fields), ("facets", &config.facets)] {
        for (category, fields) in map {
            if fields.iter().all(|f| f.trim().is_empty()) {
                warnings.push(ConfigWarning::EmptyFieldList {
                    section,
                    category: *category,
                });
            }
        }
    }

    for category in &config.deployment.omit {
        if config.fields.contains_key(category) || config.facets.contains_key(category) {
            warnings.push(ConfigWarning::OmittedCategoryConfigured {
                category: *category,
            });
        }
    }

    let compiler = &config.compiler;
    if compiler.spatial_enabled && config.deployment.omit.contains(&Category::Geohashes) {
        warnings.push(ConfigWarning::SpatialWithoutGeohashes);
    }
    if compiler.disable_query_posts && compiler.geohash_query_limit > compiler.url_length_limit {
        warnings.push(ConfigWarning::GeohashLimitAboveUrlLimit {
            geohash_query_limit: compiler.geohash_query_limit,
            url_length_limit: compiler.url_length_limit,
        });
    }

    warnings
}
