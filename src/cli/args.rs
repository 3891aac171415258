// src/cli/args.rs
//! Argument groups shared by several commands

use clap::Args;
use std::path::PathBuf;

/// Selects the configuration axes
#[derive(Args, Debug, Clone, Default)]
pub struct AxisArgs {
    /// Profile name (looked up in the profiles directory) or path
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Axis assignment applied after the profile (e.g. -s build_type=Debug)
    #[arg(short = 's', long = "setting", value_name = "NAME=VALUE")]
    pub settings: Vec<String>,
}

/// Arguments of the lifecycle commands
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Recipe file, or a directory containing galley.toml
    #[arg(default_value = ".")]
    pub recipe: PathBuf,

    /// Index directory holding <name>.toml entries
    #[arg(short, long)]
    pub index: PathBuf,

    #[command(flatten)]
    pub axes: AxisArgs,

    /// Output root (default: <recipe dir>/build-galley)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// CMake executable
    #[arg(long)]
    pub cmake: Option<PathBuf>,

    /// CMake generator (e.g. Ninja)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}
