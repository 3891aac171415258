// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe file or directory
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .default_value(".")
        .help("Recipe file, or a directory containing galley.toml")
}

/// Common argument: dependency index directory
fn index_arg() -> Arg {
    Arg::new("index")
        .short('i')
        .long("index")
        .value_name("DIR")
        .required(true)
        .help("Index directory holding <name>.toml entries")
}

/// Axis selection arguments
fn axis_args() -> [Arg; 2] {
    [
        Arg::new("profile")
            .short('p')
            .long("profile")
            .help("Profile name (looked up in the profiles directory) or path"),
        Arg::new("setting")
            .short('s')
            .long("setting")
            .value_name("NAME=VALUE")
            .action(ArgAction::Append)
            .help("Axis assignment applied after the profile"),
    ]
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("Output root (default: <recipe dir>/build-galley)")
}

fn run_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(recipe_arg())
        .arg(index_arg())
        .args(axis_args())
        .arg(output_arg())
        .arg(Arg::new("cmake").long("cmake").help("CMake executable"))
        .arg(
            Arg::new("generator")
                .short('G')
                .long("generator")
                .help("CMake generator (e.g. Ninja)"),
        )
        .arg(Arg::new("jobs").short('j').long("jobs").help("Parallel build jobs"))
}

fn build_cli() -> Command {
    Command::new("galley")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Galley Contributors")
        .about("Resolve, generate, build and package native software from a recipe")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Configuration file (default: <config dir>/galley/config.toml)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Validate a recipe and show what it declares")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a recipe's requirements against an index")
                .arg(recipe_arg())
                .arg(index_arg()),
        )
        .subcommand(
            Command::new("layout")
                .about("Show the on-disk layout for a configuration")
                .arg(recipe_arg())
                .args(axis_args())
                .arg(output_arg()),
        )
        .subcommand(run_command(
            "install",
            "Resolve dependencies and generate build inputs",
        ))
        .subcommand(run_command("build", "Install, then configure and build"))
        .subcommand(run_command("create", "Build, then install into the package root"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("galley.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
