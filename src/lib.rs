// src/lib.rs

//! Galley recipe engine
//!
//! Drives a native (CMake-built) package from a declarative recipe to an
//! installable package tree for one configuration at a time.
//!
//! # Architecture
//!
//! - Recipes: TOML manifests declaring identity, requirements and axes
//! - Resolution: each requirement pinned to the highest matching index version
//! - Profiles: axis sets whose canonical digest isolates on-disk outputs
//! - Generators: CMake lookup, toolchain and presets files, rewritten every run
//! - Lifecycle: an explicit state machine over resolve, layout, generate,
//!   build and package

pub mod config;
mod error;
pub mod generate;
pub mod hash;
pub mod layout;
pub mod lifecycle;
pub mod recipe;
pub mod resolver;
pub mod settings;
pub mod toolchain;
pub mod version;

pub use config::EngineConfig;
pub use error::{Error, Result, ToolchainStep};
pub use generate::{ArtifactGenerator, ArtifactKind, GeneratedArtifact};
pub use layout::{Layout, LayoutRoots};
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleReport, LifecycleState, Phase};
pub use recipe::{parse_recipe, parse_recipe_file, validate_recipe, Recipe, Requirement};
pub use resolver::{
    ConstraintResolver, DependencyIndex, FileIndex, MemoryIndex, Resolution, ResolvedDependency,
};
pub use settings::{AxisSet, Profile, ProfileId};
pub use toolchain::{BuildToolchain, CMakeToolchain};
pub use version::{PackageVersion, VersionConstraint};
