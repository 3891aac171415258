// src/layout/mod.rs

//! On-disk layout of a recipe build
//!
//! Paths are pure functions of the recipe identity, the profile identity and
//! the two configured roots:
//!
//! ```text
//! <source root>                                              shared by every profile
//! <output root>/build/<name>-<version>/<profile>/            build root
//! <output root>/build/<name>-<version>/<profile>/generators/ generated files
//! <output root>/package/<name>-<version>/<profile>/          package root
//! ```
//!
//! Distinct profiles never share a build, generated or package root, so runs
//! for different configurations can proceed side by side.

use crate::error::{Error, Result};
use crate::recipe::RecipeIdentity;
use crate::settings::ProfileId;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name of the generated-files root inside a build root
pub const GENERATORS_DIR: &str = "generators";

/// Roots the layout is computed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRoots {
    /// Directory holding the recipe's sources
    pub source_root: PathBuf,
    /// Directory under which build and package outputs live
    pub output_root: PathBuf,
}

impl LayoutRoots {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
        }
    }
}

/// The four filesystem roots of one (recipe, profile) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_root: PathBuf,
    pub build_root: PathBuf,
    pub generated_root: PathBuf,
    pub package_root: PathBuf,
}

impl Layout {
    /// Compute the layout; performs no I/O
    pub fn compute(recipe: &RecipeIdentity, profile: &ProfileId, roots: &LayoutRoots) -> Self {
        let recipe_dir = recipe.dir_name();
        let build_root = roots
            .output_root
            .join("build")
            .join(&recipe_dir)
            .join(&profile.dir_name);
        let generated_root = build_root.join(GENERATORS_DIR);
        let package_root = roots
            .output_root
            .join("package")
            .join(&recipe_dir)
            .join(&profile.dir_name);

        Self {
            source_root: roots.source_root.clone(),
            build_root,
            generated_root,
            package_root,
        }
    }

    /// Directories a run writes to, in creation order
    pub fn output_dirs(&self) -> [&Path; 3] {
        [
            self.build_root.as_path(),
            self.generated_root.as_path(),
            self.package_root.as_path(),
        ]
    }

    /// Create the output directories
    ///
    /// Returns every directory this call created (outermost first) so a
    /// failed run can remove exactly what it added. On error, the
    /// directories created so far are returned alongside the error.
    pub fn create_dirs(&self) -> std::result::Result<Vec<PathBuf>, (Error, Vec<PathBuf>)> {
        let mut created = Vec::new();

        for dir in self.output_dirs() {
            let missing = missing_ancestors(dir);
            if let Err(source) = fs::create_dir_all(dir) {
                // Record whatever part of the chain now exists
                created.extend(missing.into_iter().filter(|p| p.exists()));
                return Err((
                    Error::LayoutIo {
                        path: dir.to_path_buf(),
                        source,
                    },
                    created,
                ));
            }
            for path in &missing {
                debug!("Created {}", path.display());
            }
            created.extend(missing);
        }

        Ok(created)
    }
}

/// Ancestors of `dir` (including itself) that do not exist yet, outermost first
fn missing_ancestors(dir: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = dir
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

/// Remove directories created by [`Layout::create_dirs`], innermost first
///
/// Only empty directories are removed; failures are returned for logging.
pub fn remove_created_dirs(created: &[PathBuf]) -> Vec<(PathBuf, std::io::Error)> {
    let mut failures = Vec::new();
    for dir in created.iter().rev() {
        if let Err(e) = fs::remove_dir(dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            failures.push((dir.clone(), e));
        }
    }
    failures
}
