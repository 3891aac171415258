// src/commands/layout.rs

//! Layout command - show where a configuration's outputs go

use super::{load_recipe, resolve_axes};
use crate::cli::AxisArgs;
use anyhow::Result;
use galley::{EngineConfig, Layout, LayoutRoots};
use std::path::{Path, PathBuf};

/// Print the profile identity and the computed roots
///
/// Nothing is created on disk.
pub fn cmd_layout(
    recipe_path: &Path,
    axes: &AxisArgs,
    output: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<()> {
    let loaded = load_recipe(recipe_path)?;
    let axis_set = resolve_axes(&loaded.recipe, config, axes)?;
    let profile = axis_set.profile_id();

    let output_root = output.unwrap_or_else(|| config.output_root(&loaded.dir));
    let roots = LayoutRoots::new(&loaded.dir, output_root);
    let layout = Layout::compute(&loaded.recipe.identity(), &profile, &roots);

    println!("Recipe: {}", loaded.recipe.identity());
    println!("Profile: {}", profile.identity);
    println!("  Digest: {}", profile.digest);
    println!("  Directory: {}", profile.dir_name);
    println!();
    println!("Source root:    {}", layout.source_root.display());
    println!("Build root:     {}", layout.build_root.display());
    println!("Generated root: {}", layout.generated_root.display());
    println!("Package root:   {}", layout.package_root.display());

    Ok(())
}
