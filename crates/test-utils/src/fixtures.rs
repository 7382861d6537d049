//! Temporary config directory fixtures.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::generators::write_bytes;

/// A temporary directory holding YAML configs, grid files and map images.
///
/// The directory is removed when the fixture is dropped.
pub struct ConfigFixture {
    dir: TempDir,
}

impl ConfigFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a binary file next to the configs.
    pub fn binary(&self, name: &str, bytes: &[u8]) -> PathBuf {
        write_bytes(self.path(), name, bytes)
    }

    /// Write a config file; `yaml` is written verbatim.
    pub fn config(&self, name: &str, yaml: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create config dir");
        }
        std::fs::write(&path, yaml).expect("failed to write config");
        path
    }
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Common body names used across tests.
pub mod bodies {
    pub const KERBIN: &str = "Kerbin";
    pub const DUNA: &str = "Duna";
    pub const EVE: &str = "Eve";
}
