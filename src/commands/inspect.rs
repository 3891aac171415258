// src/commands/inspect.rs

//! Inspect command - validate a recipe and show its declarations

use super::{load_recipe, print_warnings};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a recipe and print identity, requirements and sources
pub fn cmd_inspect(recipe_path: &Path) -> Result<()> {
    let loaded = load_recipe(recipe_path)?;
    let recipe = &loaded.recipe;
    let package = &recipe.package;

    println!("Recipe: {} version {}", package.name, package.version);
    println!("  Type: {}", package.package_type.as_str());
    if let Some(license) = &package.license {
        println!("  License: {}", license);
    }
    if let Some(author) = &package.author {
        println!("  Author: {}", author);
    }
    if let Some(url) = &package.url {
        println!("  URL: {}", url);
    }
    if let Some(description) = &package.description {
        println!("  Description: {}", description);
    }
    println!("  Settings: {}", recipe.settings.join(", "));
    println!("  Presets file: {}", recipe.generate.presets_file);

    let requirements = recipe.requirements()?;
    println!("\nRequirements ({}):", requirements.len());
    for requirement in &requirements {
        let kind = if requirement.constraint.is_exact() {
            "pinned"
        } else {
            "range"
        };
        println!("  {} ({})", requirement, kind);
    }

    let exported = recipe
        .exported_sources(&loaded.dir)
        .context("Failed to expand exports_sources")?;
    println!("\nExported sources ({} file(s)):", exported.files.len());
    for file in &exported.files {
        let shown = file.strip_prefix(&loaded.dir).unwrap_or(file);
        println!("  {}", shown.display());
    }

    let mut warnings = loaded.warnings.clone();
    warnings.extend(
        exported
            .unmatched
            .iter()
            .map(|pattern| format!("exports_sources pattern '{}' matched no files", pattern)),
    );

    println!();
    print_warnings(&warnings);
    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }

    Ok(())
}
