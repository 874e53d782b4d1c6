//! Integration tests for sift-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> merge -> catalog.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use sift_config::{Config, ConfigError, ConfigWarning, is_global_config};
use sift_query::{Category, Encoding, FilterState, compile};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    /// Directory removed on drop.
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

/// Loads only the files under the test directory.
fn load_local(cwd: &Path) -> Result<Config, ConfigError> {
    let files: Vec<PathBuf> = sift_config::discover_config_files(cwd)
        .into_iter()
        .filter(|p| !is_global_config(p))
        .collect();
    Config::load_from_files(&files)
}

#[test]
fn test_load_no_config_returns_default() {
    let env = TestEnv::new();
    let config = load_local(env.path()).unwrap();

    assert!(config.files.is_empty());
    assert!(config.config_root.is_none());
    assert_eq!(config.validate(), vec![ConfigWarning::NoConfigFiles]);
}

#[test]
fn test_nested_configs_merge_closest_first() {
    let env = TestEnv::new();
    env.create_file(
        ".sift.toml",
        r#"
[compiler]
encoding = "raw"
geohash_query_limit = 1500

[fields]
creator = ["author", "origin"]
"#,
    );
    env.create_file(
        "site/.sift.toml",
        r#"
[compiler]
geohash_query_limit = 1200

[deployment]
omit = "annotation"
"#,
    );
    let cwd = env.create_dir("site/states");

    let config = load_local(&cwd).unwrap();
    assert_eq!(config.compiler.encoding, Encoding::Raw);
    assert_eq!(config.compiler.geohash_query_limit, 1200);
    assert_eq!(config.fields[&Category::Creator], vec!["author", "origin"]);
    assert_eq!(config.deployment.omit, vec![Category::Annotation]);
    assert_eq!(config.config_root, Some(env.path().join("site")));
    assert_eq!(config.files.len(), 2);
}

#[test]
fn test_root_config_hides_parents() {
    let env = TestEnv::new();
    env.create_file(".sift.toml", "[fields]\nspatial = \"placeKey\"\n");
    env.create_file("catalog/.sift.toml", "root = true\n");
    let cwd = env.create_dir("catalog/states");

    let config = Config::load(&cwd).unwrap();
    assert_eq!(config.files, vec![env.path().join("catalog/.sift.toml")]);
    assert!(config.fields.is_empty());
}

#[test]
fn test_configured_catalog_drives_compilation() {
    let env = TestEnv::new();
    env.create_file(
        ".sift.toml",
        r#"
[compiler]
encoding = "raw"

[fields]
creator = ["author", "origin"]
"#,
    );
    let config = load_local(env.path()).unwrap();

    let mut state = FilterState::new(config.defaults_for_year(2026));
    state.set_values(Category::Creator, ["Kibele"]).unwrap();
    let query = compile(&state, &config.catalog(), &config.compiler, None);
    assert_eq!(query.text, "(author:Kibele AND origin:Kibele)");
}

#[test]
fn test_omitted_category_cannot_be_set() {
    let env = TestEnv::new();
    env.create_file(".sift.toml", "[deployment]\nomit = [\"annotation\"]\n");
    let config = load_local(env.path()).unwrap();

    let mut state = FilterState::new(config.defaults_for_year(2026));
    assert!(state.set_values(Category::Annotation, ["x"]).is_err());
}

#[test]
fn test_invalid_toml_reports_path() {
    let env = TestEnv::new();
    let path = env.create_file(".sift.toml", "[compiler\n");

    match load_local(env.path()) {
        Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_category_is_rejected() {
    let env = TestEnv::new();
    env.create_file(".sift.toml", "[fields]\ncolour = \"hue\"\n");

    let err = load_local(env.path()).unwrap_err();
    assert!(err.to_string().contains("unknown filter category 'colour'"));
}

#[test]
fn test_validate_reports_conflicts() {
    let env = TestEnv::new();
    env.create_file(
        ".sift.toml",
        r#"
[facets]
annotation = "sem_annotation"

[deployment]
omit = ["annotation", "geohashes"]
"#,
    );
    let warnings = load_local(env.path()).unwrap().validate();
    assert!(warnings.contains(&ConfigWarning::OmittedCategoryConfigured {
        category: Category::Annotation,
    }));
    assert!(warnings.contains(&ConfigWarning::SpatialWithoutGeohashes));
}
