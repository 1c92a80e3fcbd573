// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // commands report their result on stdout

//! `sync`, `new-fb` and `to-master`

use anyhow::Result;
use gp_config::{LogFormatSetting, LogLevelSetting, SchemaRoot};
use gp_core::{
    new_feature_branch, to_master, BranchRepository, CombineStrategy, ConfigDefaults, SyncOptions,
    SyncOrchestrator, SyncReport,
};
use gp_logging::{CliLogLevel, LogFormat};
use gp_repo::GitBackend;

use crate::{NewFbArgs, StrategyArgs, SyncArgs};

/// Engine fallbacks taken from tool settings
pub fn engine_defaults(settings: &SchemaRoot) -> ConfigDefaults {
    ConfigDefaults {
        integration_branch: settings.integration_branch.clone(),
        remote_name: settings.remote_name.clone(),
        default_rebase_sync: settings.default_rebase_sync,
    }
}

pub fn log_level(setting: LogLevelSetting) -> CliLogLevel {
    match setting {
        LogLevelSetting::Error => CliLogLevel::Error,
        LogLevelSetting::Warn => CliLogLevel::Warn,
        LogLevelSetting::Info => CliLogLevel::Info,
        LogLevelSetting::Debug => CliLogLevel::Debug,
        LogLevelSetting::Trace => CliLogLevel::Trace,
    }
}

pub fn log_format(setting: LogFormatSetting) -> LogFormat {
    match setting {
        LogFormatSetting::Plaintext => LogFormat::Plaintext,
        LogFormatSetting::Json => LogFormat::Json,
    }
}

fn strategy(repo: &BranchRepository<'_>, args: StrategyArgs) -> Result<CombineStrategy> {
    Ok(CombineStrategy::select(
        args.explicit(),
        repo.config().default_rebase_sync()?,
    ))
}

fn print_report(report: &SyncReport) {
    let mut line = format!("{} is at {}", report.branch, report.tip.abbrev());
    match &report.push {
        Some(push) => line.push_str(&format!(" ({})", push.decision)),
        None => line.push_str(" (not pushed)"),
    }
    println!("{line}");
}

pub fn run_sync(git: &dyn GitBackend, defaults: ConfigDefaults, args: SyncArgs) -> Result<()> {
    let repo = BranchRepository::new(git, defaults);
    let options = SyncOptions {
        strategy: strategy(&repo, args.strategy)?,
        local_only: args.local,
    };
    let report = SyncOrchestrator::new(&repo).sync(options)?;
    print_report(&report);
    Ok(())
}

pub fn run_new_fb(git: &dyn GitBackend, defaults: ConfigDefaults, args: &NewFbArgs) -> Result<()> {
    let repo = BranchRepository::new(git, defaults);
    let branch = new_feature_branch(&repo, &args.name, args.local)?;
    println!("Switched to new branch {branch} at {}", branch.sha(git)?);
    Ok(())
}

pub fn run_to_master(
    git: &dyn GitBackend,
    defaults: ConfigDefaults,
    args: StrategyArgs,
) -> Result<()> {
    let repo = BranchRepository::new(git, defaults);
    let options = SyncOptions {
        strategy: strategy(&repo, args)?,
        local_only: false,
    };
    let report = to_master(&repo, options)?;
    print_report(&report.sync);
    println!("Pushed {} onto the integration branch", report.sync.branch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_become_engine_defaults() {
        let settings = SchemaRoot {
            integration_branch: Some("origin/main".into()),
            default_rebase_sync: Some(false),
            ..Default::default()
        };
        let defaults = engine_defaults(&settings);
        assert_eq!(defaults.integration_branch.as_deref(), Some("origin/main"));
        assert_eq!(defaults.remote_name, None);
        assert_eq!(defaults.default_rebase_sync, Some(false));
    }

    #[test]
    fn logging_settings_map_onto_logging_flags() {
        assert_eq!(log_level(LogLevelSetting::Trace), CliLogLevel::Trace);
        assert_eq!(log_format(LogFormatSetting::Json), LogFormat::Json);
    }
}
