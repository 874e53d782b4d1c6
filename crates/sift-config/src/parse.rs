//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
use sift_query::Encoding;
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Compiler settings section.
    pub compiler: Option<RawCompilerSettings>,
    /// Index field overrides: category -> field(s).
    pub fields: Option<BTreeMap<String, RawFieldList>>,
    /// Facet field overrides: category -> field(s).
    pub facets: Option<BTreeMap<String, RawFieldList>>,
    /// Deployment section.
    pub deployment: Option<RawDeployment>,
}

/// Raw compiler settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCompilerSettings {
    /// Only GET requests can reach the index.
    pub disable_query_posts: Option<bool>,
    /// Whether the map filter is offered.
    pub spatial_enabled: Option<bool>,
    /// Value encoding (`"url"` or `"raw"`).
    pub encoding: Option<Encoding>,
    /// Query length past which geohash cells are dropped.
    pub geohash_query_limit: Option<usize>,
    /// URL length past which requests switch to POST.
    pub url_length_limit: Option<usize>,
}

/// One field name or a list of them.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RawFieldList(#[serde_as(as = "OneOrMany<_>")] pub Vec<String>);

/// Raw deployment settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDeployment {
    /// Categories the index does not support.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub omit: Option<Vec<String>>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
///
/// Useful for validating template content (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// This is used during discovery to stop traversal at root configs.
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config_str("", Path::new("test.toml")).unwrap();
        assert!(config.root.is_none());
        assert!(config.compiler.is_none());
        assert!(config.fields.is_none());
        assert!(config.facets.is_none());
        assert!(config.deployment.is_none());
    }

    #[test]
    fn test_parse_compiler_settings() {
        let toml = r#"
[compiler]
disable_query_posts = true
encoding = "raw"
geohash_query_limit = 1500
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let compiler = config.compiler.unwrap();
        assert_eq!(compiler.disable_query_posts, Some(true));
        assert_eq!(compiler.encoding, Some(Encoding::Raw));
        assert_eq!(compiler.geohash_query_limit, Some(1500));
        assert!(compiler.spatial_enabled.is_none());
        assert!(compiler.url_length_limit.is_none());
    }

    #[test]
    fn test_parse_field_one_or_many() {
        let toml = r#"
[fields]
creator = "author"
taxon = ["genus", "species"]
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let fields = config.fields.unwrap();
        assert_eq!(fields["creator"], RawFieldList(vec!["author".into()]));
        assert_eq!(
            fields["taxon"],
            RawFieldList(vec!["genus".into(), "species".into()])
        );
    }

    #[test]
    fn test_parse_deployment_omit() {
        let config = parse_config_str(
            "[deployment]\nomit = \"annotation\"\n",
            Path::new("test.toml"),
        )
        .unwrap();
        assert_eq!(
            config.deployment.unwrap().omit,
            Some(vec!["annotation".to_string()])
        );

        let config = parse_config_str(
            "[deployment]\nomit = [\"annotation\", \"attribute\"]\n",
            Path::new("test.toml"),
        )
        .unwrap();
        assert_eq!(config.deployment.unwrap().omit.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_invalid_encoding() {
        let result = parse_config_str("[compiler]\nencoding = \"base64\"\n", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::ParseToml { .. })));
    }

    #[test]
    fn test_parse_invalid_toml_reports_path() {
        let err = parse_config_str("[compiler\n", Path::new("/tmp/bad.toml")).unwrap_err();
        assert!(err.to_string().contains("/tmp/bad.toml"));
    }

    #[test]
    fn test_root_flag() {
        let config = parse_config("root = true\n").unwrap();
        assert_eq!(config.root, Some(true));
    }
}
