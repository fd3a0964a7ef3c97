//! Shared fixtures for tests that run real `bin/detect` executables

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway lifecycle layout: app, platform, buildpacks and layers dirs
/// plus an order file.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        for dir in ["app", "platform", "buildpacks", "layers"] {
            fs::create_dir_all(root.path().join(dir)).expect("Failed to create workspace dir");
        }
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn app_dir(&self) -> PathBuf {
        self.path().join("app")
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.path().join("platform")
    }

    pub fn buildpacks_dir(&self) -> PathBuf {
        self.path().join("buildpacks")
    }

    pub fn layers_dir(&self) -> PathBuf {
        self.path().join("layers")
    }

    pub fn order_path(&self) -> PathBuf {
        self.path().join("order.toml")
    }

    pub fn write_order(&self, contents: &str) -> &Self {
        fs::write(self.order_path(), contents).expect("Failed to write order.toml");
        self
    }

    fn buildpack_dir(&self, id: &str, version: &str) -> PathBuf {
        self.buildpacks_dir()
            .join(id.replace('/', "_"))
            .join(version)
    }

    /// Adds a leaf buildpack whose `bin/detect` is the given shell script body.
    pub fn leaf(&self, id: &str, version: &str, script: &str) -> &Self {
        let dir = self.buildpack_dir(id, version);
        fs::create_dir_all(dir.join("bin")).expect("Failed to create buildpack dir");
        fs::write(
            dir.join("buildpack.toml"),
            format!(
                "api = \"0.9\"\n\n[buildpack]\nid = \"{}\"\nversion = \"{}\"\n",
                id, version
            ),
        )
        .expect("Failed to write buildpack.toml");

        let detect = dir.join("bin").join("detect");
        fs::write(&detect, format!("#!/bin/sh\n{}\n", script)).expect("Failed to write bin/detect");
        make_executable(&detect);
        self
    }

    /// Adds a composite buildpack whose descriptor carries `order` verbatim.
    pub fn composite(&self, id: &str, version: &str, order: &str) -> &Self {
        let dir = self.buildpack_dir(id, version);
        fs::create_dir_all(&dir).expect("Failed to create buildpack dir");
        fs::write(
            dir.join("buildpack.toml"),
            format!(
                "api = \"0.9\"\n\n[buildpack]\nid = \"{}\"\nversion = \"{}\"\n\n{}",
                id, version, order
            ),
        )
        .expect("Failed to write buildpack.toml");
        self
    }

    pub fn read_layer_file(&self, name: &str) -> String {
        fs::read_to_string(self.layers_dir().join(name))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", name, e))
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make bin/detect executable");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

pub const PASS: &str = "exit 0";
pub const FAIL: &str = "exit 100";
