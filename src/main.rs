// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use galley::Phase;
use std::io;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { recipe } => commands::cmd_inspect(&recipe),

        Commands::Resolve { recipe, index } => commands::cmd_resolve(&recipe, &index),

        Commands::Layout {
            recipe,
            axes,
            output,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_layout(&recipe, &axes, output, &config)
        }

        Commands::Install(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_run(args, Phase::Generate, config)
        }

        Commands::Build(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_run(args, Phase::Build, config)
        }

        Commands::Create(args) => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_run(args, Phase::Package, config)
        }

        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "galley", &mut io::stdout());
            Ok(())
        }
    }
}
