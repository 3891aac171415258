// src/generate/mod.rs

//! Build-tool input artifacts
//!
//! The generator turns a resolution and an axis set into the files CMake
//! reads before configuring: one lookup pair per dependency, a toolchain
//! file and a presets document. Content depends only on those two inputs,
//! so identical inputs always give byte-identical files.
//!
//! Every call replaces the target directory wholesale. Files left by an
//! earlier call (for example for a dependency that is no longer required)
//! never survive into the new set.

mod cmake;
mod presets;

pub use cmake::TOOLCHAIN_FILE;
pub use presets::preset_name;

use crate::error::{Error, Result};
use crate::hash::{hash_bytes, ContentHash, HashAlgorithm};
use crate::recipe::{Recipe, DEFAULT_PRESETS_FILE};
use crate::resolver::{BuildInfo, Resolution, ResolvedDependency};
use crate::settings::AxisSet;
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use strum_macros::Display;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// What a generated file is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ArtifactKind {
    /// Lets the build locate one dependency
    DependencyLookup,
    /// Configures the build tool for the axis set
    Toolchain,
}

/// A file written by [`ArtifactGenerator::generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// File name inside the target directory
    pub name: String,
    pub kind: ArtifactKind,
    /// SHA-256 of the file content
    pub digest: ContentHash,
}

struct RenderedFile {
    name: String,
    kind: ArtifactKind,
    content: String,
}

/// Writes CMake input artifacts for a resolution and axis set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactGenerator {
    presets_file: String,
}

impl Default for ArtifactGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PRESETS_FILE)
    }
}

impl ArtifactGenerator {
    pub fn new(presets_file: impl Into<String>) -> Self {
        Self {
            presets_file: presets_file.into(),
        }
    }

    /// Generator configured by the recipe's `[generate]` section
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self::new(recipe.generate.presets_file.clone())
    }

    pub fn presets_file(&self) -> &str {
        &self.presets_file
    }

    /// Write the artifacts into `target_dir`, replacing whatever it held
    ///
    /// Dependency metadata is checked before the directory is touched, so a
    /// resolution the build could not consume leaves earlier output intact.
    pub fn generate(
        &self,
        resolution: &Resolution,
        axes: &AxisSet,
        target_dir: &Path,
    ) -> Result<Vec<GeneratedArtifact>> {
        let files = self.render(resolution, axes, target_dir)?;

        reset_dir(target_dir)?;

        let mut artifacts = Vec::with_capacity(files.len());
        for file in files {
            let path = target_dir.join(&file.name);
            write_atomic(target_dir, &path, file.content.as_bytes())?;

            let digest = hash_bytes(HashAlgorithm::Sha256, file.content.as_bytes());
            debug!("Wrote {} ({})", path.display(), digest.to_prefixed_string());

            artifacts.push(GeneratedArtifact {
                name: file.name,
                kind: file.kind,
                digest,
            });
        }

        info!(
            "Generated {} artifact(s) in {}",
            artifacts.len(),
            target_dir.display()
        );
        Ok(artifacts)
    }

    /// Render every artifact in memory, in output order
    fn render(
        &self,
        resolution: &Resolution,
        axes: &AxisSet,
        target_dir: &Path,
    ) -> Result<Vec<RenderedFile>> {
        let mut files = Vec::with_capacity(resolution.len() * 2 + 2);

        for dep in resolution.iter() {
            let info = required_build_info(dep)?;
            files.push(RenderedFile {
                name: cmake::config_file_name(dep),
                kind: ArtifactKind::DependencyLookup,
                content: cmake::render_config(dep, info),
            });
            files.push(RenderedFile {
                name: cmake::config_version_file_name(dep),
                kind: ArtifactKind::DependencyLookup,
                content: cmake::render_config_version(dep),
            });
        }

        files.push(RenderedFile {
            name: TOOLCHAIN_FILE.to_string(),
            kind: ArtifactKind::Toolchain,
            content: cmake::render_toolchain(axes, resolution.iter().map(|d| d.name.as_str())),
        });

        let presets = presets::render_presets(axes).map_err(|e| Error::GenerationIo {
            path: target_dir.join(&self.presets_file),
            source: std::io::Error::other(e),
        })?;
        files.push(RenderedFile {
            name: self.presets_file.clone(),
            kind: ArtifactKind::Toolchain,
            content: presets,
        });

        check_unique_names(&files, target_dir)?;
        Ok(files)
    }
}

/// Reject file names that would overwrite each other, including on
/// case-insensitive file systems
fn check_unique_names(files: &[RenderedFile], target_dir: &Path) -> Result<()> {
    let mut seen = HashSet::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.name.to_lowercase()) {
            return Err(generation_io(
                &target_dir.join(&file.name),
                std::io::Error::new(ErrorKind::AlreadyExists, "file generated more than once"),
            ));
        }
    }
    Ok(())
}

/// Metadata the lookup files are built from
fn required_build_info(dep: &ResolvedDependency) -> Result<&BuildInfo> {
    let info = dep
        .build_info
        .as_ref()
        .ok_or_else(|| Error::MissingDependencyMetadata {
            name: dep.name.clone(),
            detail: format!("index entry '{}' has no build_info", dep.locator),
        })?;

    if info.include_dirs.is_empty() {
        return Err(Error::MissingDependencyMetadata {
            name: dep.name.clone(),
            detail: "no include directories".to_string(),
        });
    }

    Ok(info)
}

fn generation_io(path: &Path, source: std::io::Error) -> Error {
    Error::GenerationIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Remove any previous contents and recreate the directory
fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => debug!("Removed previous artifacts in {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(generation_io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| generation_io(dir, e))
}

/// Write through a temporary file in the same directory, then rename
fn write_atomic(dir: &Path, path: &Path, content: &[u8]) -> Result<()> {
    let mut file = NamedTempFile::new_in(dir).map_err(|e| generation_io(path, e))?;
    file.write_all(content).map_err(|e| generation_io(path, e))?;
    file.as_file().sync_all().map_err(|e| generation_io(path, e))?;
    file.persist(path).map_err(|e| generation_io(path, e.error))?;
    Ok(())
}
