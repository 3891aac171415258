// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe a native package: its identity,
//! the dependencies it requires, the configuration axes it is built for,
//! and the sources that make up its source tree.

use crate::error::{Error, Result};
use crate::recipe::requirement::Requirement;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Conventional recipe file name inside a recipe directory
pub const RECIPE_FILE_NAME: &str = "galley.toml";

/// Default file name for the CMake presets artifact
pub const DEFAULT_PRESETS_FILE: &str = "GalleyPresets.json";

/// A complete recipe for building a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Configuration axes this recipe is built for
    ///
    /// Format: `["os", "compiler", "build_type", "arch"]`
    #[serde(default)]
    pub settings: Vec<String>,

    /// Glob patterns (relative to the recipe directory) of the sources
    /// that make up the source tree
    #[serde(default)]
    pub exports_sources: Vec<String>,

    /// Dependency references
    ///
    /// Format: `["fmt/10.1.0", "spdlog/[^1.11.0]"]`
    #[serde(default)]
    pub requires: Vec<String>,

    /// Package metadata
    pub package: PackageSection,

    /// Generator options
    #[serde(default)]
    pub generate: GenerateSection,
}

impl Recipe {
    /// Identity used to derive the package's on-disk layout
    pub fn identity(&self) -> RecipeIdentity {
        RecipeIdentity {
            name: self.package.name.clone(),
            version: self.package.version.clone(),
        }
    }

    /// Parse every `requires` reference, rejecting duplicate names
    ///
    /// Names are compared case-insensitively: generated file names are
    /// lowercased, so "FMT" and "fmt" would share artifacts.
    pub fn requirements(&self) -> Result<Vec<Requirement>> {
        let mut seen = HashSet::new();
        let mut requirements = Vec::with_capacity(self.requires.len());

        for reference in &self.requires {
            let requirement = Requirement::parse(reference)?;
            if !seen.insert(requirement.name.to_lowercase()) {
                return Err(Error::DuplicateRequirement(requirement.name));
            }
            requirements.push(requirement);
        }

        Ok(requirements)
    }

    /// Expand `exports_sources` against the recipe directory
    pub fn exported_sources(&self, recipe_dir: &Path) -> Result<ExportedSources> {
        let mut files = BTreeSet::new();
        let mut unmatched = Vec::new();

        for pattern in &self.exports_sources {
            let full = recipe_dir.join(pattern);
            let entries = glob::glob(&full.to_string_lossy()).map_err(|e| {
                Error::ParseError(format!("Invalid exports_sources pattern '{}': {}", pattern, e))
            })?;

            let mut matched = false;
            for entry in entries {
                let path = entry.map_err(|e| {
                    Error::IoError(format!("Failed to expand '{}': {}", pattern, e))
                })?;
                files.insert(path);
                matched = true;
            }

            if !matched {
                unmatched.push(pattern.clone());
            }
        }

        Ok(ExportedSources {
            files: files.into_iter().collect(),
            unmatched,
        })
    }
}

/// Result of expanding `exports_sources`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedSources {
    /// Matched paths, sorted
    pub files: Vec<PathBuf>,
    /// Patterns that matched nothing
    pub unmatched: Vec<String>,
}

/// Name and version of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeIdentity {
    pub name: String,
    pub version: String,
}

impl RecipeIdentity {
    /// Directory name used for this recipe under the output root
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for RecipeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// What kind of artifact the package produces
    #[serde(default)]
    pub package_type: PackageType,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Author and contact
    #[serde(default)]
    pub author: Option<String>,

    /// Project URL
    #[serde(default)]
    pub url: Option<String>,

    /// Full description
    #[serde(default)]
    pub description: Option<String>,
}

/// Kind of package a recipe produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    #[default]
    Application,
    Library,
    StaticLibrary,
    SharedLibrary,
    HeaderLibrary,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
            Self::StaticLibrary => "static-library",
            Self::SharedLibrary => "shared-library",
            Self::HeaderLibrary => "header-library",
        }
    }
}

/// Generator options section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSection {
    /// File name of the CMake presets artifact
    #[serde(default = "default_presets_file")]
    pub presets_file: String,
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            presets_file: default_presets_file(),
        }
    }
}

fn default_presets_file() -> String {
    DEFAULT_PRESETS_FILE.to_string()
}
