// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Workflow settings persisted in the repository's git config.
//!
//! Everything lives under the `gitProcess` section. Values missing from git
//! config fall back to [`ConfigDefaults`], which the CLI fills from its
//! layered tool settings.

use gp_repo::GitBackend;
use tracing::warn;

use crate::error::Result;

pub const INTEGRATION_BRANCH_KEY: &str = "gitProcess.integrationBranch";
pub const DEFAULT_REBASE_SYNC_KEY: &str = "gitProcess.defaultRebaseSync";
pub const REMOTE_NAME_KEY: &str = "gitProcess.remoteName";

/// Fallbacks consulted when the matching `gitProcess.*` key is unset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDefaults {
    pub integration_branch: Option<String>,
    pub remote_name: Option<String>,
    pub default_rebase_sync: Option<bool>,
}

/// Upstream tracking as stored in `branch.<name>.remote` / `.merge`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Remote name, or `.` for a local upstream
    pub remote: String,
    /// Full reference name on that remote, e.g. `refs/heads/master`
    pub merge: String,
}

/// The configuration collaborator of the engine
pub struct ProcessConfig<'g> {
    git: &'g dyn GitBackend,
    defaults: ConfigDefaults,
}

impl<'g> ProcessConfig<'g> {
    pub fn new(git: &'g dyn GitBackend, defaults: ConfigDefaults) -> Self {
        Self { git, defaults }
    }

    /// Configured integration branch name, if any. Never writes.
    pub fn integration_branch_name(&self) -> Result<Option<String>> {
        let value = self.git.config_get(INTEGRATION_BRANCH_KEY)?;
        Ok(non_empty(value).or_else(|| self.defaults.integration_branch.clone()))
    }

    pub fn set_integration_branch_name(&self, full_ref_name: &str) -> Result<()> {
        self.git.config_set(INTEGRATION_BRANCH_KEY, full_ref_name)?;
        Ok(())
    }

    /// Whether `sync` rebases unless told otherwise; defaults to `true`
    pub fn default_rebase_sync(&self) -> Result<bool> {
        let fallback = self.defaults.default_rebase_sync.unwrap_or(true);
        match non_empty(self.git.config_get(DEFAULT_REBASE_SYNC_KEY)?) {
            None => Ok(fallback),
            Some(raw) => Ok(parse_git_bool(&raw).unwrap_or_else(|| {
                warn!(key = DEFAULT_REBASE_SYNC_KEY, value = %raw, "Ignoring non-boolean config value");
                fallback
            })),
        }
    }

    /// Remote to sync with.
    ///
    /// An explicit setting wins, then `origin`, then the first remote in
    /// sorted order. `None` when the repository has no remotes.
    pub fn remote_name(&self, remotes: &[String]) -> Result<Option<String>> {
        if remotes.is_empty() {
            return Ok(None);
        }
        let configured = non_empty(self.git.config_get(REMOTE_NAME_KEY)?)
            .or_else(|| self.defaults.remote_name.clone());
        if let Some(name) = configured {
            if remotes.contains(&name) {
                return Ok(Some(name));
            }
            warn!(remote = %name, "Configured remote does not exist; falling back");
        }
        if remotes.iter().any(|r| r == "origin") {
            return Ok(Some("origin".to_string()));
        }
        let mut sorted = remotes.to_vec();
        sorted.sort();
        Ok(sorted.into_iter().next())
    }

    pub fn upstream(&self, local_short_name: &str) -> Result<Option<UpstreamConfig>> {
        let remote = non_empty(self.git.config_get(&format!("branch.{local_short_name}.remote"))?);
        let merge = non_empty(self.git.config_get(&format!("branch.{local_short_name}.merge"))?);
        Ok(remote.zip(merge).map(|(remote, merge)| UpstreamConfig { remote, merge }))
    }

    pub fn set_upstream(&self, local_short_name: &str, upstream: &UpstreamConfig) -> Result<()> {
        self.git.config_set(&format!("branch.{local_short_name}.remote"), &upstream.remote)?;
        self.git.config_set(&format!("branch.{local_short_name}.merge"), &upstream.merge)?;
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// git's boolean spellings
pub fn parse_git_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gp_repo::MockGitBackend;
    use mockall::predicate::eq;

    fn config_backend(entries: &[(&str, &str)]) -> MockGitBackend {
        let entries: Vec<(String, String)> =
            entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let mut git = MockGitBackend::new();
        git.expect_config_get().returning(move |key| {
            Ok(entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
        });
        git
    }

    #[test]
    fn git_config_wins_over_defaults() {
        let git = config_backend(&[(INTEGRATION_BRANCH_KEY, "refs/remotes/upstream/main")]);
        let defaults = ConfigDefaults {
            integration_branch: Some("develop".into()),
            ..Default::default()
        };
        let config = ProcessConfig::new(&git, defaults);
        assert_eq!(
            config.integration_branch_name().unwrap().as_deref(),
            Some("refs/remotes/upstream/main")
        );
    }

    #[test]
    fn defaults_fill_unset_keys() {
        let git = config_backend(&[]);
        let defaults = ConfigDefaults {
            integration_branch: Some("develop".into()),
            default_rebase_sync: Some(false),
            ..Default::default()
        };
        let config = ProcessConfig::new(&git, defaults);
        assert_eq!(config.integration_branch_name().unwrap().as_deref(), Some("develop"));
        assert!(!config.default_rebase_sync().unwrap());
    }

    #[test]
    fn default_rebase_sync_parses_git_booleans() {
        assert!(ProcessConfig::new(&config_backend(&[]), ConfigDefaults::default())
            .default_rebase_sync()
            .unwrap());
        for (raw, expected) in [("false", false), ("No", false), ("on", true), ("garbage", true)] {
            let git = config_backend(&[(DEFAULT_REBASE_SYNC_KEY, raw)]);
            let config = ProcessConfig::new(&git, ConfigDefaults::default());
            assert_eq!(config.default_rebase_sync().unwrap(), expected, "value {raw}");
        }
    }

    #[test]
    fn remote_name_prefers_setting_then_origin_then_first_sorted() {
        let remotes = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let git = config_backend(&[(REMOTE_NAME_KEY, "fork")]);
        let config = ProcessConfig::new(&git, ConfigDefaults::default());
        assert_eq!(
            config.remote_name(&remotes(&["origin", "fork"])).unwrap().as_deref(),
            Some("fork")
        );

        let git = config_backend(&[]);
        let config = ProcessConfig::new(&git, ConfigDefaults::default());
        assert_eq!(
            config.remote_name(&remotes(&["zeta", "origin"])).unwrap().as_deref(),
            Some("origin")
        );
        assert_eq!(
            config.remote_name(&remotes(&["zeta", "alpha"])).unwrap().as_deref(),
            Some("alpha")
        );
        assert_eq!(config.remote_name(&[]).unwrap(), None);
    }

    #[test]
    fn set_upstream_writes_remote_and_merge() {
        let mut git = MockGitBackend::new();
        git.expect_config_set()
            .with(eq("branch.feature.remote"), eq("origin"))
            .times(1)
            .returning(|_, _| Ok(()));
        git.expect_config_set()
            .with(eq("branch.feature.merge"), eq("refs/heads/master"))
            .times(1)
            .returning(|_, _| Ok(()));
        let config = ProcessConfig::new(&git, ConfigDefaults::default());
        config
            .set_upstream(
                "feature",
                &UpstreamConfig {
                    remote: "origin".into(),
                    merge: "refs/heads/master".into(),
                },
            )
            .unwrap();
    }
}
