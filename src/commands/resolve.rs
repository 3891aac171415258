// src/commands/resolve.rs

//! Resolve command - pin a recipe's requirements against an index

use super::{load_recipe, print_warnings};
use anyhow::{Context, Result};
use galley::{ConstraintResolver, FileIndex};
use std::path::Path;

/// Resolve every requirement to the highest satisfying index version
pub fn cmd_resolve(recipe_path: &Path, index_dir: &Path) -> Result<()> {
    let loaded = load_recipe(recipe_path)?;
    print_warnings(&loaded.warnings);

    let requirements = loaded.recipe.requirements()?;
    let index = FileIndex::new(index_dir);
    let resolution = ConstraintResolver::new(&index)
        .resolve(&requirements)
        .with_context(|| {
            format!(
                "Failed to resolve requirements of {} against {}",
                loaded.recipe.identity(),
                index_dir.display()
            )
        })?;

    println!(
        "Resolved {} requirement(s) for {}:",
        resolution.len(),
        loaded.recipe.identity()
    );
    for requirement in &requirements {
        let Some(dep) = resolution.get(&requirement.name) else {
            continue;
        };
        let metadata = if dep.build_info.is_some() {
            ""
        } else {
            " (no build metadata)"
        };
        println!(
            "  {} -> {} [{}]{}",
            requirement, dep.version, dep.locator, metadata
        );
    }

    Ok(())
}
