// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // errors are reported on stderr

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use gp_cli::commands::{self, engine_defaults};
use gp_cli::{Cli, Commands};
use gp_repo::{GitBackend, GitCli};
use tracing::debug;

/// Bad options, `--help` or `--version`
const EXIT_USAGE: u8 = 1;
/// The command ran and failed
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // engine errors already carry their step and cause in Display
            match err.downcast_ref::<gp_core::Error>() {
                Some(engine) => eprintln!("{engine}"),
                None => eprintln!("{err:#}"),
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let git = GitCli::open(&cwd);

    let mut flags = Vec::new();
    let level = cli.logging.log_level.map(|l| l.to_string());
    let format = cli.logging.log_format.map(|f| f.to_string());
    if let Some(level) = &level {
        flags.push(("log-level", level.as_str()));
    }
    if let Some(format) = &format {
        flags.push(("log-format", format.as_str()));
    }

    let paths = gp_config::discover_paths(git.as_ref().ok().map(|g| g.root()))
        .with_cli_config(cli.config.clone());
    let resolved = gp_config::load_all(&paths, &flags)?;
    let settings = resolved.settings()?;

    cli.logging
        .clone()
        .with_fallbacks(
            settings.log_level.map(commands::log_level),
            settings.log_format.map(commands::log_format),
        )
        .init("gp-cli")?;
    debug!(?paths, "Loaded settings");

    let defaults = engine_defaults(&settings);
    match &cli.command {
        Commands::Config { subcommand } => {
            let backend = git.as_ref().ok().map(|g| g as &dyn GitBackend);
            subcommand.run(&resolved, backend)
        }
        Commands::Sync(args) => commands::run_sync(&git?, defaults, *args),
        Commands::NewFb(args) => commands::run_new_fb(&git?, defaults, args),
        Commands::ToMaster(args) => commands::run_to_master(&git?, defaults, *args),
    }
}
