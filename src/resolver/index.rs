// src/resolver/index.rs

//! Dependency index lookups
//!
//! The index is an external, read-only service mapping a dependency name to
//! the versions it publishes. The resolver only needs a listing per name, so
//! anything from an in-memory table to a remote registry can sit behind
//! [`DependencyIndex`].

use crate::error::{Error, Result};
use crate::recipe::is_valid_name;
use crate::version::PackageVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Include/link metadata a build toolchain needs to consume a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link, without prefix or suffix ("fmt", not "libfmt.a")
    #[serde(default)]
    pub libs: Vec<String>,
    /// Preprocessor definitions ("FMT_HEADER_ONLY=1")
    #[serde(default)]
    pub defines: Vec<String>,
    /// Imported target name; defaults to `<name>::<name>`
    #[serde(default)]
    pub cmake_target: Option<String>,
}

/// One published version of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub version: PackageVersion,
    /// Opaque locator for the package's build metadata (path, URL, cache key)
    pub locator: String,
    #[serde(default)]
    pub build_info: Option<BuildInfo>,
}

impl IndexEntry {
    pub fn new(version: PackageVersion, locator: impl Into<String>) -> Self {
        Self {
            version,
            locator: locator.into(),
            build_info: None,
        }
    }

    pub fn with_build_info(mut self, build_info: BuildInfo) -> Self {
        self.build_info = Some(build_info);
        self
    }
}

/// Trait for looking up dependency versions
///
/// Implementations must be safe to query concurrently; the resolver never
/// mutates the index.
pub trait DependencyIndex: Send + Sync {
    /// All published versions of `name`
    ///
    /// Returns `None` if the index has no entry for the name at all.
    fn versions(&self, name: &str) -> Result<Option<Vec<IndexEntry>>>;
}

/// An in-process index
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    packages: BTreeMap<String, Vec<IndexEntry>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a published version
    pub fn add(&mut self, name: impl Into<String>, entry: IndexEntry) {
        self.packages.entry(name.into()).or_default().push(entry);
    }

    /// Builder-style [`MemoryIndex::add`]
    pub fn with_entry(mut self, name: impl Into<String>, entry: IndexEntry) -> Self {
        self.add(name, entry);
        self
    }
}

impl DependencyIndex for MemoryIndex {
    fn versions(&self, name: &str) -> Result<Option<Vec<IndexEntry>>> {
        Ok(self.packages.get(name).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    versions: Vec<IndexEntry>,
}

/// An index stored as a directory of `<name>.toml` files
///
/// ```toml
/// [[versions]]
/// version = "1.11.2"
/// locator = "/opt/deps/spdlog/1.11.2"
///
/// [versions.build_info]
/// include_dirs = ["/opt/deps/spdlog/1.11.2/include"]
/// lib_dirs = ["/opt/deps/spdlog/1.11.2/lib"]
/// libs = ["spdlog"]
/// ```
#[derive(Debug, Clone)]
pub struct FileIndex {
    root: PathBuf,
}

impl FileIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.toml", name))
    }
}

impl DependencyIndex for FileIndex {
    fn versions(&self, name: &str) -> Result<Option<Vec<IndexEntry>>> {
        // Names that could escape the index root are never present in it
        if !is_valid_name(name) {
            return Ok(None);
        }

        let path = self.entry_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No index entry at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::IndexError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let file: IndexFile = toml::from_str(&content).map_err(|e| {
            Error::IndexError(format!("Invalid index entry {}: {}", path.display(), e))
        })?;

        Ok(Some(file.versions))
    }
}
