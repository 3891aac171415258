// src/commands/mod.rs
//! Command handlers for the galley CLI

mod inspect;
mod layout;
mod resolve;
mod run;

pub use inspect::cmd_inspect;
pub use layout::cmd_layout;
pub use resolve::cmd_resolve;
pub use run::cmd_run;

use crate::cli::AxisArgs;
use anyhow::{Context, Result};
use galley::recipe::{parse_recipe_file, validate_recipe, Recipe, RECIPE_FILE_NAME};
use galley::settings::{parse_assignment, AxisSet, Profile};
use galley::EngineConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the profile used when none is given
const DEFAULT_PROFILE: &str = "default";

/// A parsed and validated recipe
pub struct LoadedRecipe {
    pub recipe: Recipe,
    /// Absolute directory the recipe lives in; its source root
    pub dir: PathBuf,
    pub warnings: Vec<String>,
}

/// Load the configuration file, if any
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => {
            let default = galley::config::default_config_path();
            EngineConfig::load_or_default(default.as_deref())
                .context("Failed to load configuration")
        }
    }
}

/// Parse and validate a recipe given as a file or a directory
pub fn load_recipe(path: &Path) -> Result<LoadedRecipe> {
    let file = if path.is_dir() {
        path.join(RECIPE_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    let recipe = parse_recipe_file(&file)
        .with_context(|| format!("Failed to parse recipe: {}", file.display()))?;
    let warnings = validate_recipe(&recipe)
        .with_context(|| format!("Recipe validation failed: {}", file.display()))?;

    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir = std::path::absolute(&dir)
        .with_context(|| format!("Failed to resolve recipe directory: {}", dir.display()))?;

    debug!("Loaded recipe {} from {}", recipe.identity(), file.display());
    Ok(LoadedRecipe {
        recipe,
        dir,
        warnings,
    })
}

/// Build the axis set from the profile and `-s` assignments
///
/// Without `--profile`, the `default` profile is used when it exists.
pub fn resolve_axes(recipe: &Recipe, config: &EngineConfig, args: &AxisArgs) -> Result<AxisSet> {
    let mut assignments = Vec::new();

    let profile_path = match &args.profile {
        Some(profile) => Some(config.profile_path(profile)),
        None => Some(config.profile_path(DEFAULT_PROFILE)).filter(|path| path.is_file()),
    };
    if let Some(path) = profile_path {
        let profile = Profile::load(&path)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?;
        debug!("Using profile '{}' from {}", profile.name, path.display());
        assignments.extend(profile.assignments);
    }

    for setting in &args.settings {
        assignments.push(parse_assignment(setting)?);
    }

    AxisSet::from_assignments(&assignments, &recipe.settings)
        .context("Invalid configuration axes (use --profile or -s name=value)")
}

/// Print recipe warnings the way every command reports them
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("Warning: {}", warning);
    }
}
