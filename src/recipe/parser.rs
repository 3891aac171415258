// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::generate::TOOLCHAIN_FILE;
use crate::recipe::format::Recipe;
use crate::recipe::requirement::is_valid_name;
use crate::settings::AXIS_NAMES;
use std::collections::HashSet;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Returns warnings for optional metadata that is missing.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    // Name and version end up in layout paths
    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if !is_valid_name(&recipe.package.name) {
        return Err(Error::ParseError(format!(
            "Recipe package name '{}' must be a single path component",
            recipe.package.name
        )));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }
    if !is_valid_name(&recipe.package.version) {
        return Err(Error::ParseError(format!(
            "Recipe package version '{}' must be a single path component",
            recipe.package.version
        )));
    }

    recipe.requirements()?;

    let mut declared = HashSet::new();
    for setting in &recipe.settings {
        if !AXIS_NAMES.contains(&setting.as_str()) {
            return Err(Error::ParseError(format!(
                "Unknown setting '{}'. Expected one of: {}",
                setting,
                AXIS_NAMES.join(", ")
            )));
        }
        if !declared.insert(setting.as_str()) {
            return Err(Error::ParseError(format!("Setting '{}' declared twice", setting)));
        }
    }

    let missing: Vec<&str> = AXIS_NAMES
        .iter()
        .copied()
        .filter(|axis| !declared.contains(axis))
        .collect();
    if !missing.is_empty() {
        return Err(Error::ParseError(format!(
            "Recipe must declare every configuration axis; missing: {}",
            missing.join(", ")
        )));
    }

    // Written into the generators directory, never outside it
    if !is_valid_name(&recipe.generate.presets_file) {
        return Err(Error::ParseError(format!(
            "Presets file '{}' must be a plain file name",
            recipe.generate.presets_file
        )));
    }
    // CMake files in that directory belong to the generator
    if recipe.generate.presets_file == TOOLCHAIN_FILE
        || recipe.generate.presets_file.to_lowercase().ends_with(".cmake")
    {
        return Err(Error::ParseError(format!(
            "Presets file '{}' would replace a generated CMake file",
            recipe.generate.presets_file
        )));
    }

    // Warn about missing fields
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.package.url.is_none() {
        warnings.push("Missing package url".to_string());
    }
    if recipe.package.author.is_none() {
        warnings.push("Missing package author".to_string());
    }
    if recipe.exports_sources.is_empty() {
        warnings.push("No exports_sources declared; the source tree is not described".to_string());
    }

    Ok(warnings)
}
