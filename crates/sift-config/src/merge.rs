//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single `Config`, applying
//! precedence rules and resolving category names.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use sift_query::{Category, CompilerConfig};

use crate::{
    Config, ConfigError, Deployment,
    parse::{RawCompilerSettings, RawConfig, RawFieldList},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Compiler settings: first defined value wins (highest precedence)
/// - Field and facet overrides: merged by category, first definition wins
/// - Deployment omit list: first defined list wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let compiler = merge_compiler(configs);
    let fields = merge_field_map(configs, "fields", |c| c.fields.as_ref())?;
    let facets = merge_field_map(configs, "facets", |c| c.facets.as_ref())?;
    let deployment = merge_deployment(configs)?;
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);
    let files = configs.iter().map(|c| c.path.clone()).collect();

    Ok(Config {
        compiler,
        fields,
        facets,
        deployment,
        config_root,
        files,
    })
}

/// Merges compiler settings, taking the first defined value for each field.
fn merge_compiler(configs: &[ParsedConfig]) -> CompilerConfig {
    let mut result = CompilerConfig::default();

    // Lowest precedence first so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(ref compiler) = parsed.config.compiler {
            apply_raw_compiler(&mut result, compiler);
        }
    }

    result
}

/// Applies raw compiler settings to result, overwriting any present values.
fn apply_raw_compiler(result: &mut CompilerConfig, raw: &RawCompilerSettings) {
    if let Some(v) = raw.disable_query_posts {
        result.disable_query_posts = v;
    }
    if let Some(v) = raw.spatial_enabled {
        result.spatial_enabled = v;
    }
    if let Some(v) = raw.encoding {
        result.encoding = v;
    }
    if let Some(v) = raw.geohash_query_limit {
        result.geohash_query_limit = v;
    }
    if let Some(v) = raw.url_length_limit {
        result.url_length_limit = v;
    }
}

/// Resolves a category name from `section` of the file at `path`.
fn parse_category(name: &str, section: &'static str, path: &Path) -> Result<Category, ConfigError> {
    name.parse().map_err(|_| ConfigError::UnknownCategory {
        path: path.to_path_buf(),
        section,
        name: name.to_string(),
    })
}

/// Merges a category -> fields section; the first definition of a category wins.
fn merge_field_map<F>(
    configs: &[ParsedConfig],
    section: &'static str,
    select: F,
) -> Result<BTreeMap<Category, Vec<String>>, ConfigError>
where
    F: Fn(&RawConfig) -> Option<&BTreeMap<String, RawFieldList>>,
{
    let mut merged = BTreeMap::new();
    for parsed in configs {
        let Some(entries) = select(&parsed.config) else {
            continue;
        };
        for (name, RawFieldList(fields)) in entries {
            let category = parse_category(name, section, &parsed.path)?;
            merged.entry(category).or_insert_with(|| fields.clone());
        }
    }
    Ok(merged)
}

/// Takes the omit list from the closest file that defines one.
fn merge_deployment(configs: &[ParsedConfig]) -> Result<Deployment, ConfigError> {
    let found = configs.iter().find_map(|parsed| {
        parsed
            .config
            .deployment
            .as_ref()
            .and_then(|d| d.omit.as_ref())
            .map(|omit| (parsed, omit))
    });
    let Some((parsed, names)) = found else {
        return Ok(Deployment::default());
    };

    let omit = names
        .iter()
        .map(|name| parse_category(name, "deployment", &parsed.path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Deployment { omit })
}

#[cfg(test)]
mod tests {
    use sift_query::Encoding;

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]).unwrap();
        assert_eq!(result.compiler, CompilerConfig::default());
        assert!(result.fields.is_empty());
        assert!(result.config_root.is_none());
    }

    #[test]
    fn test_closest_compiler_setting_wins() {
        let near = parsed(
            "/srv/catalog/site/.sift.toml",
            "[compiler]\ngeohash_query_limit = 1200\n",
        );
        let far = parsed(
            "/srv/catalog/.sift.toml",
            "[compiler]\ngeohash_query_limit = 1800\nencoding = \"raw\"\n",
        );

        let result = merge_configs(&[near, far]).unwrap();
        assert_eq!(result.compiler.geohash_query_limit, 1200);
        assert_eq!(result.compiler.encoding, Encoding::Raw);
        assert!(result.compiler.spatial_enabled);
        assert_eq!(result.config_root, Some(PathBuf::from("/srv/catalog/site")));
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn test_field_overrides_merge_by_category() {
        let near = parsed("/a/b/.sift.toml", "[fields]\ncreator = \"author\"\n");
        let far = parsed(
            "/a/.sift.toml",
            "[fields]\ncreator = \"origin\"\nspatial = [\"site\", \"placeKey\"]\n",
        );

        let result = merge_configs(&[near, far]).unwrap();
        assert_eq!(result.fields[&Category::Creator], vec!["author"]);
        assert_eq!(result.fields[&Category::Spatial], vec!["site", "placeKey"]);
    }

    #[test]
    fn test_unknown_field_category_is_an_error() {
        let config = parsed("/a/.sift.toml", "[facets]\ncolour = \"hue\"\n");
        let err = merge_configs(&[config]).unwrap_err();
        match err {
            ConfigError::UnknownCategory { section, name, .. } => {
                assert_eq!(section, "facets");
                assert_eq!(name, "colour");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_closest_omit_list_wins() {
        let near = parsed("/a/b/.sift.toml", "[deployment]\nomit = \"annotation\"\n");
        let far = parsed(
            "/a/.sift.toml",
            "[deployment]\nomit = [\"attribute\", \"annotation\"]\n",
        );
        let result = merge_configs(&[near, far]).unwrap();
        assert_eq!(result.deployment.omit, vec![Category::Annotation]);
    }

    #[test]
    fn test_unknown_omit_category_is_an_error() {
        let config = parsed("/a/.sift.toml", "[deployment]\nomit = [\"colour\"]\n");
        assert!(matches!(
            merge_configs(&[config]),
            Err(ConfigError::UnknownCategory {
                section: "deployment",
                ..
            })
        ));
    }
}
