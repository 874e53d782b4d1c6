//! Test helpers shared across sift-config unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::discovery::CONFIG_FILENAME;

/// Temporary directory holding config files.
pub struct TestDir {
    /// Directory removed on drop.
    root: TempDir,
}

impl TestDir {
    /// Creates an empty temporary directory.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a subdirectory.
    pub fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes a comment-only `.sift.toml` in a subdirectory.
    pub fn create_config(&self, rel_path: &str) -> PathBuf {
        self.create_config_with_content(rel_path, "# catalog config\n")
    }

    /// Writes a comment-only `.sift.toml` at the top of the directory.
    pub fn create_config_at_root(&self) -> PathBuf {
        self.create_config_with_content("", "# shared config\n")
    }

    /// Writes a `.sift.toml` with the given contents in a subdirectory.
    pub fn create_config_with_content(&self, rel_path: &str, content: &str) -> PathBuf {
        let dir = self.create_dir(rel_path);
        let config = dir.join(CONFIG_FILENAME);
        fs::write(&config, content).unwrap();
        config
    }

    /// Writes a `root = true` config in a subdirectory.
    pub fn create_root_config(&self, rel_path: &str) -> PathBuf {
        self.create_config_with_content(rel_path, "root = true\n")
    }
}
