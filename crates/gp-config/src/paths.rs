// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Where settings files live

use std::path::{Path, PathBuf};

/// Settings file name at the top of a work tree
pub const REPO_CONFIG_FILE: &str = ".git-process.toml";

const APP_DIR: &str = "git-process";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub system: PathBuf,
    pub user: PathBuf,
    pub repo: Option<PathBuf>,
    /// File given with `--config`
    pub cli_config: Option<PathBuf>,
}

impl Paths {
    pub fn with_cli_config(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config = path;
        self
    }
}

pub fn discover_paths(work_tree: Option<&Path>) -> Paths {
    Paths {
        system: system_config_path(),
        user: user_config_path(),
        repo: work_tree.map(|root| root.join(REPO_CONFIG_FILE)),
        cli_config: None,
    }
}

fn system_config_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support")
            .join(APP_DIR)
            .join(CONFIG_FILE)
    } else if cfg!(target_os = "windows") {
        PathBuf::from(std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".into()))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    } else {
        PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILE)
    }
}

/// `$GIT_PROCESS_HOME/config.toml`, else the platform config directory
fn user_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("GIT_PROCESS_HOME") {
        return PathBuf::from(home).join(CONFIG_FILE);
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(CONFIG_FILE)
}
