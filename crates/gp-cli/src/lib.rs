// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line surface of git-process

pub mod commands;
pub mod config_commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gp_core::CombineStrategy;
use gp_logging::CliLoggingArgs;

#[derive(Parser, Debug)]
#[command(name = "git-process", version, about = "Team git workflow: feature branches, sync, and safe pushes")]
pub struct Cli {
    /// Extra settings file, applied above user and repository settings
    #[arg(long, global = true, env = "GIT_PROCESS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring the current branch up to date with the integration branch and push it
    Sync(SyncArgs),
    /// Create a feature branch off the integration branch
    NewFb(NewFbArgs),
    /// Sync, then push the current branch onto the integration branch
    ToMaster(StrategyArgs),
    /// Inspect tool settings or set the integration branch
    Config {
        #[command(subcommand)]
        subcommand: config_commands::ConfigCommands,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct StrategyArgs {
    /// Rebase onto the integration branch
    #[arg(short = 'r', long, conflicts_with = "merge")]
    pub rebase: bool,

    /// Merge the integration branch in
    #[arg(long)]
    pub merge: bool,
}

impl StrategyArgs {
    /// The strategy asked for on the command line, if any
    pub fn explicit(self) -> Option<CombineStrategy> {
        match (self.rebase, self.merge) {
            (true, _) => Some(CombineStrategy::Rebase),
            (_, true) => Some(CombineStrategy::Merge),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SyncArgs {
    /// Do not fetch or push
    #[arg(long)]
    pub local: bool,

    #[command(flatten)]
    pub strategy: StrategyArgs,
}

#[derive(Args, Debug, Clone)]
pub struct NewFbArgs {
    /// Name of the branch to create
    pub name: String,

    /// Do not fetch first
    #[arg(long)]
    pub local: bool,
}
