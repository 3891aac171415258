// src/cli/mod.rs
//! CLI definitions for galley
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Lifecycle commands run the phases up to a stopping point:
//! - `install` - resolve, lay out and generate build inputs
//! - `build` - additionally configure and build
//! - `create` - additionally install into the package root
//!
//! Inspection commands never run the build tool:
//! - `inspect` - validate a recipe and show what it declares
//! - `resolve` - pin requirements against an index
//! - `layout` - show where a configuration's outputs would go

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod args;

pub use args::{AxisArgs, RunArgs};

#[derive(Parser)]
#[command(name = "galley")]
#[command(author = "Galley Contributors")]
#[command(version)]
#[command(about = "Resolve, generate, build and package native software from a recipe", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/galley/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a recipe and show what it declares
    Inspect {
        /// Recipe file, or a directory containing galley.toml
        #[arg(default_value = ".")]
        recipe: PathBuf,
    },

    /// Resolve a recipe's requirements against an index
    Resolve {
        /// Recipe file, or a directory containing galley.toml
        #[arg(default_value = ".")]
        recipe: PathBuf,

        /// Index directory holding <name>.toml entries
        #[arg(short, long)]
        index: PathBuf,
    },

    /// Show the on-disk layout for a configuration
    Layout {
        /// Recipe file, or a directory containing galley.toml
        #[arg(default_value = ".")]
        recipe: PathBuf,

        #[command(flatten)]
        axes: AxisArgs,

        /// Output root (default: <recipe dir>/build-galley)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve dependencies and generate build inputs
    Install(RunArgs),

    /// Install, then configure and build
    Build(RunArgs),

    /// Build, then install into the package root
    Create(RunArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
