// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `config` subcommands

use anyhow::{Context, Result};
use clap::Subcommand;
use gp_config::{Provenance, Resolved};
use gp_core::config::{DEFAULT_REBASE_SYNC_KEY, INTEGRATION_BRANCH_KEY, REMOTE_NAME_KEY};
use gp_core::{BranchRepository, ConfigDefaults};
use gp_repo::GitBackend;
use serde_json::Value as J;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved tool settings
    Show {
        /// Only show this key
        key: Option<String>,
        /// Show which layer each value came from
        #[arg(long)]
        show_origin: bool,
    },
    /// Explain where a setting's value comes from
    Explain {
        key: String,
    },
    /// Record the integration branch in git config
    SetIntegrationBranch {
        /// Branch name, e.g. `origin/master`
        branch: String,
    },
}

impl ConfigCommands {
    pub fn run(&self, resolved: &Resolved, git: Option<&dyn GitBackend>) -> Result<()> {
        match self {
            ConfigCommands::Show { key, show_origin } => {
                show(resolved, key.as_deref(), *show_origin);
                Ok(())
            }
            ConfigCommands::Explain { key } => explain(resolved, key, git),
            ConfigCommands::SetIntegrationBranch { branch } => {
                let git = git.context("Not inside a git work tree")?;
                set_integration_branch(git, branch)
            }
        }
    }
}

fn show(resolved: &Resolved, key: Option<&str>, show_origin: bool) {
    match key {
        Some(key) => match resolved.json.get(key) {
            Some(value) => print_entry(key, value, show_origin, &resolved.provenance),
            None => println!("Configuration key '{key}' not set"),
        },
        None => {
            if let J::Object(map) = &resolved.json {
                for (key, value) in map {
                    print_entry(key, value, show_origin, &resolved.provenance);
                }
            }
        }
    }
}

fn print_entry(key: &str, value: &J, show_origin: bool, provenance: &Provenance) {
    match provenance.winner.get(key).filter(|_| show_origin) {
        Some(scope) => println!("{key}={value} (from {scope})"),
        None => println!("{key}={value}"),
    }
}

/// git config key that takes precedence over a tool setting, if any
fn git_config_key(setting: &str) -> Option<&'static str> {
    match setting {
        "integration-branch" => Some(INTEGRATION_BRANCH_KEY),
        "remote-name" => Some(REMOTE_NAME_KEY),
        "default-rebase-sync" => Some(DEFAULT_REBASE_SYNC_KEY),
        _ => None,
    }
}

fn explain(resolved: &Resolved, key: &str, git: Option<&dyn GitBackend>) -> Result<()> {
    println!("Configuration key: {key}");
    match resolved.provenance.winner.get(key) {
        Some(scope) => println!("Winning scope: {scope}"),
        None => println!("Not set in any settings layer"),
    }
    if let Some(changes) = resolved.provenance.changes.get(key) {
        println!("Change history:");
        for (scope, value) in changes {
            println!("  {scope}: {value}");
        }
    }

    if let (Some(git_key), Some(git)) = (git_config_key(key), git) {
        if let Some(value) = git.config_get(git_key)? {
            println!("Overridden by git config {git_key}={value}");
        }
    }
    Ok(())
}

fn set_integration_branch(git: &dyn GitBackend, name: &str) -> Result<()> {
    let repo = BranchRepository::new(git, ConfigDefaults::default());
    let branch = repo.branch(name)?;
    repo.set_integration_branch(&branch)?;
    println!("Integration branch set to {}", branch.name());
    Ok(())
}
