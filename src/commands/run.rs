// src/commands/run.rs

//! Lifecycle commands - install, build and create

use super::{load_recipe, print_warnings, resolve_axes};
use crate::cli::RunArgs;
use anyhow::{Context, Result};
use galley::{CMakeToolchain, EngineConfig, FileIndex, Lifecycle, LayoutRoots, Phase};
use tracing::info;

/// Drive the lifecycle through `last`
pub fn cmd_run(args: RunArgs, last: Phase, mut config: EngineConfig) -> Result<()> {
    if let Some(cmake) = args.cmake {
        config.cmake_program = cmake;
    }
    if let Some(generator) = args.generator {
        config.generator = Some(generator);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }

    let loaded = load_recipe(&args.recipe)?;
    print_warnings(&loaded.warnings);

    let axes = resolve_axes(&loaded.recipe, &config, &args.axes)?;
    let output_root = args.output.unwrap_or_else(|| config.output_root(&loaded.dir));
    let roots = LayoutRoots::new(&loaded.dir, output_root);

    let index = FileIndex::new(&args.index);
    let toolchain = CMakeToolchain::from_config(&config, axes.build_type);

    let identity = loaded.recipe.identity();
    info!("Using index {}", index.root().display());
    println!("{} [{}]", identity, axes.identity());

    let lifecycle = Lifecycle::new(loaded.recipe, axes, roots, &index, &toolchain);
    let report = lifecycle
        .run(last)
        .with_context(|| format!("Failed to {} {}", verb(last), identity))?;

    println!("\nResolved {} dependency(ies):", report.resolution.len());
    for dep in report.resolution.iter() {
        println!("  {}/{}", dep.name, dep.version);
    }

    if let Some(layout) = &report.layout {
        println!(
            "\nGenerated {} file(s) in {}:",
            report.artifacts.len(),
            layout.generated_root.display()
        );
        for artifact in &report.artifacts {
            println!("  {} ({})", artifact.name, artifact.kind);
        }
        if last >= Phase::Build {
            println!("\nBuild root: {}", layout.build_root.display());
        }
        if last == Phase::Package {
            println!("Package root: {}", layout.package_root.display());
        }
    }

    println!("\n[OK] {} [{}] {}", report.recipe, report.profile, report.state);
    Ok(())
}

fn verb(last: Phase) -> &'static str {
    match last {
        Phase::Package => "create",
        Phase::Build => "build",
        _ => "install",
    }
}
