// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use galley::{BuildToolchain, Error, ToolchainStep};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Recipe shared by the end-to-end scenarios
pub const RACE_N_CHASE: &str = r#"
settings = ["os", "compiler", "build_type", "arch"]
exports_sources = ["CMakeLists.txt", "programs/*", "src/*"]
requires = ["fmt/10.1.0", "spdlog/[^1.11.0]"]

[package]
name = "RaceNChase"
version = "0.1"
package_type = "application"
license = "MIT"
description = "A little racing game"
"#;

/// Linux/gcc-13/Release/x86_64 axis assignments
pub fn linux_gcc_release() -> Vec<(String, String)> {
    [
        ("os", "linux"),
        ("compiler", "gcc"),
        ("compiler.version", "13"),
        ("build_type", "Release"),
        ("arch", "x86_64"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Create a source tree holding the recipe and a minimal CMake project.
///
/// Returns (TempDir, recipe_dir) - keep the TempDir alive to prevent cleanup.
pub fn setup_source_tree(recipe: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let recipe_dir = temp_dir.path().join("race-n-chase");
    fs::create_dir_all(recipe_dir.join("src")).unwrap();
    fs::create_dir_all(recipe_dir.join("programs")).unwrap();

    fs::write(recipe_dir.join("galley.toml"), recipe).unwrap();
    fs::write(
        recipe_dir.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.15)\n\
         project(RaceNChase NONE)\n\
         install(FILES src/game.txt DESTINATION share)\n",
    )
    .unwrap();
    fs::write(recipe_dir.join("src/game.txt"), "vroom\n").unwrap();
    fs::write(recipe_dir.join("programs/main.txt"), "start\n").unwrap();

    (temp_dir, recipe_dir)
}

/// Write one `<name>.toml` index entry per (name, versions) pair
pub fn setup_index(root: &Path, packages: &[(&str, &[&str])]) -> PathBuf {
    let index_dir = root.join("index");
    fs::create_dir_all(&index_dir).unwrap();

    for (name, versions) in packages {
        let mut content = String::new();
        for version in versions.iter() {
            content.push_str(&format!(
                r#"
[[versions]]
version = "{version}"
locator = "/opt/deps/{name}/{version}"

[versions.build_info]
include_dirs = ["/opt/deps/{name}/{version}/include"]
lib_dirs = ["/opt/deps/{name}/{version}/lib"]
libs = ["{name}"]
"#
            ));
        }
        fs::write(index_dir.join(format!("{}.toml", name)), content).unwrap();
    }

    index_dir
}

/// Index with fmt 10.1.0 and spdlog 1.11.2 alongside older releases
pub fn setup_default_index(root: &Path) -> PathBuf {
    setup_index(
        root,
        &[
            ("fmt", &["9.1.0", "10.1.0"]),
            ("spdlog", &["1.10.0", "1.11.0", "1.11.2"]),
        ],
    )
}

/// Toolchain that records every step instead of running CMake
#[derive(Default)]
pub struct RecordingToolchain {
    calls: Mutex<Vec<ToolchainStep>>,
    fail_on: Option<ToolchainStep>,
}

impl RecordingToolchain {
    pub fn failing(step: ToolchainStep) -> Self {
        Self {
            fail_on: Some(step),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolchainStep> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, step: ToolchainStep) -> galley::Result<()> {
        self.calls.lock().unwrap().push(step);
        if self.fail_on == Some(step) {
            return Err(Error::ExternalToolchain {
                step,
                exit_status: Some(2),
                detail: format!("cmake {} exited with status 2", step),
            });
        }
        Ok(())
    }
}

impl BuildToolchain for RecordingToolchain {
    fn configure(&self, _: &Path, _: &Path, _: &Path) -> galley::Result<()> {
        self.record(ToolchainStep::Configure)
    }

    fn build(&self, _: &Path) -> galley::Result<()> {
        self.record(ToolchainStep::Build)
    }

    fn install(&self, _: &Path, _: &Path) -> galley::Result<()> {
        self.record(ToolchainStep::Install)
    }
}

/// Every file in a directory as (name, content) pairs, sorted by name
pub fn read_dir_contents(dir: &Path) -> Vec<(String, String)> {
    let mut contents: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read_to_string(entry.path()).unwrap(),
            )
        })
        .collect();
    contents.sort();
    contents
}
