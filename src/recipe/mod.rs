// src/recipe/mod.rs

//! Recipe system for describing native packages
//!
//! A recipe declares:
//! - Package identity (name, version, license, author, url, description)
//! - Dependency requirements with version constraints
//! - The configuration axes the package is built for
//! - The sources that make up its source tree
//!
//! # Example Recipe
//!
//! ```toml
//! settings = ["os", "compiler", "build_type", "arch"]
//! exports_sources = ["CMakeLists.txt", "programs/*", "src/*"]
//! requires = ["fmt/10.1.0", "spdlog/[^1.11.0]", "gtest/[^1.14.0]"]
//!
//! [package]
//! name = "RaceNChase"
//! version = "0.1"
//! package_type = "application"
//! license = "MIT"
//! ```

mod format;
pub mod parser;
mod requirement;

pub use format::{
    ExportedSources, GenerateSection, PackageSection, PackageType, Recipe, RecipeIdentity,
    DEFAULT_PRESETS_FILE, RECIPE_FILE_NAME,
};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use requirement::Requirement;
pub(crate) use requirement::is_valid_name;
