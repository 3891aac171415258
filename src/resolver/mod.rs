// src/resolver/mod.rs

//! Constraint resolution against a dependency index
//!
//! Each requirement is resolved on its own to the highest index version that
//! satisfies its constraint. There is no negotiation between requirements: if
//! two dependencies need different versions of a shared transitive
//! dependency, both pins are reported as-is.

mod index;

pub use index::{BuildInfo, DependencyIndex, FileIndex, IndexEntry, MemoryIndex};

use crate::error::{Error, Result};
use crate::recipe::Requirement;
use crate::version::PackageVersion;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// A requirement pinned to a concrete index version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub name: String,
    pub version: PackageVersion,
    /// Opaque locator for the dependency's build metadata
    pub locator: String,
    pub build_info: Option<BuildInfo>,
}

impl ResolvedDependency {
    /// Pin `requirement` to `entry`
    ///
    /// Fails if the entry's version does not satisfy the requirement.
    pub fn new(requirement: &Requirement, entry: IndexEntry) -> Result<Self> {
        if !requirement.constraint.satisfies(&entry.version) {
            return Err(Error::UnsatisfiableConstraint {
                name: requirement.name.clone(),
                constraint: requirement.constraint.to_string(),
                available: entry.version.to_string(),
            });
        }

        Ok(Self {
            name: requirement.name.clone(),
            version: entry.version,
            locator: entry.locator,
            build_info: entry.build_info,
        })
    }

    /// Imported CMake target for this dependency
    pub fn cmake_target(&self) -> String {
        self.build_info
            .as_ref()
            .and_then(|info| info.cmake_target.clone())
            .unwrap_or_else(|| format!("{0}::{0}", self.name))
    }
}

/// Resolved dependencies keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    dependencies: BTreeMap<String, ResolvedDependency>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.dependencies.get(name)
    }

    /// Dependencies in name order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.dependencies.values()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl FromIterator<ResolvedDependency> for Resolution {
    fn from_iter<I: IntoIterator<Item = ResolvedDependency>>(iter: I) -> Self {
        Self {
            dependencies: iter.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }
}

/// Resolves requirements against a [`DependencyIndex`]
pub struct ConstraintResolver<'a> {
    index: &'a dyn DependencyIndex,
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(index: &'a dyn DependencyIndex) -> Self {
        Self { index }
    }

    /// Resolve every requirement, or fail without a partial result
    pub fn resolve(&self, requirements: &[Requirement]) -> Result<Resolution> {
        let mut dependencies = BTreeMap::new();
        // Generated artifacts are named after the lowercased dependency name
        let mut seen = HashSet::new();

        for requirement in requirements {
            if !seen.insert(requirement.name.to_lowercase()) {
                return Err(Error::DuplicateRequirement(requirement.name.clone()));
            }

            let resolved = self.resolve_one(requirement)?;
            info!("Resolved {} -> {}", requirement, resolved.version);
            dependencies.insert(requirement.name.clone(), resolved);
        }

        Ok(Resolution { dependencies })
    }

    fn resolve_one(&self, requirement: &Requirement) -> Result<ResolvedDependency> {
        let entries = self
            .index
            .versions(&requirement.name)?
            .ok_or_else(|| Error::UnknownDependency(requirement.name.clone()))?;

        debug!(
            "Index has {} version(s) of {}",
            entries.len(),
            requirement.name
        );

        let best = entries
            .iter()
            .filter(|entry| requirement.constraint.satisfies(&entry.version))
            .max_by(|a, b| a.version.cmp(&b.version))
            .cloned();

        match best {
            Some(entry) => ResolvedDependency::new(requirement, entry),
            None => {
                let mut available: Vec<&PackageVersion> =
                    entries.iter().map(|e| &e.version).collect();
                available.sort();
                let available = if available.is_empty() {
                    "none".to_string()
                } else {
                    available
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };

                Err(Error::UnsatisfiableConstraint {
                    name: requirement.name.clone(),
                    constraint: requirement.constraint.to_string(),
                    available,
                })
            }
        }
    }
}
