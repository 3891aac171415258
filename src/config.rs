// src/config.rs

//! Engine configuration
//!
//! Read from `<config dir>/galley/config.toml` when present; every field
//! has a default and can be overridden from the command line.
//!
//! ```toml
//! cmake_program = "/usr/bin/cmake"
//! generator = "Ninja"
//! jobs = 8
//! output_dir = "build-galley"
//! profiles_dir = "/home/me/.config/galley/profiles"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user configuration directory
const APP_DIR: &str = "galley";

/// Default output directory, relative to the recipe directory
pub const DEFAULT_OUTPUT_DIR: &str = "build-galley";

/// Settings shared by every lifecycle run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// CMake executable
    pub cmake_program: PathBuf,
    /// CMake generator (`-G`); CMake's own default when unset
    pub generator: Option<String>,
    /// Parallel build jobs
    pub jobs: usize,
    /// Output root; relative paths are taken from the recipe directory
    pub output_dir: PathBuf,
    /// Directory holding named profiles (`<name>.toml`)
    pub profiles_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);

        Self {
            cmake_program: PathBuf::from("cmake"),
            generator: None,
            jobs,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            profiles_dir: config_dir()
                .map(|dir| dir.join("profiles"))
                .unwrap_or_else(|| PathBuf::from("profiles")),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load the per-user configuration, falling back to defaults when absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded configuration from {}", path.display());
                Self::parse(&content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::IoError(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Output root for a recipe living in `recipe_dir`
    pub fn output_root(&self, recipe_dir: &Path) -> PathBuf {
        recipe_dir.join(&self.output_dir)
    }

    /// Location of a profile given by name or path
    ///
    /// Anything that looks like a path (a separator or a `.toml` suffix) is
    /// used as-is; a bare name is looked up in the profiles directory.
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        let path = Path::new(profile);
        if path.components().count() > 1 || profile.ends_with(".toml") {
            path.to_path_buf()
        } else {
            self.profiles_dir.join(format!("{}.toml", profile))
        }
    }
}

/// Per-user configuration directory (`~/.config/galley` on Linux)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Default configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cmake_program, PathBuf::from("cmake"));
        assert!(config.generator.is_none());
        assert!(config.jobs >= 1);
        assert_eq!(config.output_dir, PathBuf::from("build-galley"));
    }

    #[test]
    fn test_parse_partial_config() {
        let config = EngineConfig::parse("generator = \"Ninja\"\njobs = 3\n").unwrap();
        assert_eq!(config.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.jobs, 3);
        assert_eq!(config.cmake_program, PathBuf::from("cmake"));
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(matches!(
            EngineConfig::parse("jobs = \"many\""),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("config.toml");
        assert_eq!(
            EngineConfig::load_or_default(Some(&missing)).unwrap(),
            EngineConfig::default()
        );

        fs::write(&missing, "cmake_program = \"/opt/cmake/bin/cmake\"\n").unwrap();
        let config = EngineConfig::load_or_default(Some(&missing)).unwrap();
        assert_eq!(config.cmake_program, PathBuf::from("/opt/cmake/bin/cmake"));
        assert_eq!(EngineConfig::load(&missing).unwrap(), config);
    }

    #[test]
    fn test_profile_path() {
        let config = EngineConfig {
            profiles_dir: PathBuf::from("/etc/galley/profiles"),
            ..Default::default()
        };
        assert_eq!(
            config.profile_path("linux-gcc"),
            PathBuf::from("/etc/galley/profiles/linux-gcc.toml")
        );
        assert_eq!(
            config.profile_path("./ci/release.toml"),
            PathBuf::from("./ci/release.toml")
        );
        assert_eq!(config.profile_path("release.toml"), PathBuf::from("release.toml"));
    }

    #[test]
    fn test_output_root_relative_and_absolute() {
        let mut config = EngineConfig::default();
        assert_eq!(
            config.output_root(Path::new("/work/app")),
            PathBuf::from("/work/app/build-galley")
        );
        config.output_dir = PathBuf::from("/tmp/out");
        assert_eq!(config.output_root(Path::new("/work/app")), PathBuf::from("/tmp/out"));
    }
}
