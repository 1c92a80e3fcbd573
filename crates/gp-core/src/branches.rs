// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The catalog of branches in one working copy.

use gp_repo::refs::{R_HEADS, R_REMOTES};
use gp_repo::{GitBackend, ObjectId};
use tracing::{debug, info, warn};

use crate::branch::{qualify, Branch};
use crate::config::{ConfigDefaults, ProcessConfig, UpstreamConfig};
use crate::error::{Error, Precondition, Result};

/// Disposable branch used as a base while cutting feature branches
pub const PARKING_BRANCH_NAME: &str = "_parking_";

/// Branch that counts as mainline when nothing is configured
const DEFAULT_INTEGRATION_NAME: &str = "master";

/// State of a branch's counterpart on the configured remote
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteState {
    /// The repository has no remotes
    NoRemote,
    /// `remote/simpleName` does not exist (never pushed, or deleted)
    Absent { remote: String, name: String },
    Present {
        remote: String,
        branch: Branch,
        tip: ObjectId,
    },
}

pub struct BranchRepository<'g> {
    git: &'g dyn GitBackend,
    config: ProcessConfig<'g>,
}

impl<'g> BranchRepository<'g> {
    pub fn new(git: &'g dyn GitBackend, defaults: ConfigDefaults) -> Self {
        Self {
            git,
            config: ProcessConfig::new(git, defaults),
        }
    }

    pub fn git(&self) -> &'g dyn GitBackend {
        self.git
    }

    pub fn config(&self) -> &ProcessConfig<'g> {
        &self.config
    }

    pub fn remotes(&self) -> Result<Vec<String>> {
        Ok(self.git.remote_names()?)
    }

    pub fn has_remotes(&self) -> Result<bool> {
        Ok(!self.remotes()?.is_empty())
    }

    /// The remote sync talks to, if the repository has any
    pub fn remote_name(&self) -> Result<Option<String>> {
        self.config.remote_name(&self.remotes()?)
    }

    /// Look a branch up by name; `None` when it does not exist
    pub fn find_branch(&self, name: &str) -> Result<Option<Branch>> {
        Branch::find(self.git, &self.remotes()?, name)
    }

    /// Look a branch up by name, failing with `InvalidReference` when unknown
    pub fn branch(&self, name: &str) -> Result<Branch> {
        Branch::resolve(self.git, &self.remotes()?, name)
    }

    /// The branch HEAD points at; `None` when detached or unborn
    pub fn current_branch(&self) -> Result<Option<Branch>> {
        match self.git.head_ref()? {
            Some(head) => self.find_branch(&head),
            None => Ok(None),
        }
    }

    pub fn all_branches(&self) -> Result<Vec<Branch>> {
        let remotes = self.remotes()?;
        let mut names = self.git.list_branches()?;
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| Branch::from_full_name(name, &remotes))
            .collect())
    }

    pub fn local_branches(&self) -> Result<Vec<Branch>> {
        Ok(self
            .all_branches()?
            .into_iter()
            .filter(|b| b.name().starts_with(R_HEADS))
            .collect())
    }

    pub fn remote_branches(&self) -> Result<Vec<Branch>> {
        Ok(self
            .all_branches()?
            .into_iter()
            .filter(|b| b.name().starts_with(R_REMOTES))
            .collect())
    }

    /// Resolve the integration branch.
    ///
    /// Configured name first, then `<remote>/master` when there are remotes,
    /// then local `master`. Reads only; `None` means nothing resolved.
    pub fn integration_branch(&self) -> Result<Option<Branch>> {
        let remotes = self.remotes()?;

        if let Some(configured) = self.config.integration_branch_name()? {
            let found = Branch::find(self.git, &remotes, &configured)?;
            if found.is_none() {
                warn!(branch = %configured, "Configured integration branch does not exist");
            }
            return Ok(found);
        }

        let mut candidates = Vec::new();
        if let Some(remote) = self.config.remote_name(&remotes)? {
            candidates.push(format!("{remote}/{DEFAULT_INTEGRATION_NAME}"));
        }
        candidates.push(DEFAULT_INTEGRATION_NAME.to_string());

        for candidate in candidates {
            if let Some(branch) = Branch::find(self.git, &remotes, &candidate)? {
                debug!(
                    branch = %branch,
                    "Integration branch not configured, using default. \
                     Fix with `git config gitProcess.integrationBranch [branch_name]`"
                );
                return Ok(Some(branch));
            }
        }
        Ok(None)
    }

    /// Persist `branch` (full reference name) as the integration branch
    pub fn set_integration_branch(&self, branch: &Branch) -> Result<()> {
        info!(branch = %branch, "Setting integration branch");
        self.config.set_integration_branch_name(branch.name())
    }

    pub fn on_parking(&self) -> Result<bool> {
        Ok(self
            .current_branch()?
            .is_some_and(|b| !b.is_remote() && b.short_name() == PARKING_BRANCH_NAME))
    }

    /// The parking branch, created from the integration branch if missing
    pub fn parking(&self) -> Result<Branch> {
        if let Some(parking) = self.find_branch(PARKING_BRANCH_NAME)? {
            return Ok(parking);
        }
        let integration = self
            .integration_branch()?
            .ok_or(Error::PreconditionFailed(Precondition::NoIntegrationBranch))?;
        self.create_branch(PARKING_BRANCH_NAME, &integration)
    }

    /// Create a local branch at `base`'s tip
    pub fn create_branch(&self, name: &str, base: &Branch) -> Result<Branch> {
        let remotes = self.remotes()?;
        let full = qualify(name, &remotes);
        if !full.starts_with(R_HEADS) {
            return Err(Error::InvalidReference {
                name: name.to_string(),
                reason: "new branches must be local".to_string(),
            });
        }
        if Branch::find(self.git, &remotes, name)?.is_some() {
            return Err(Error::BranchAlreadyExists(name.to_string()));
        }
        let start = base.object_id(self.git)?;
        info!(branch = name, base = %base, "Creating branch");
        self.git.create_branch(name, &start)?;
        Branch::resolve(self.git, &remotes, name)
    }

    /// Delete a local branch, even when it is not merged
    pub fn remove_branch(&self, branch: &Branch) -> Result<()> {
        if branch.is_remote() {
            return Err(Error::InvalidReference {
                name: branch.short_name().to_string(),
                reason: "only local branches can be removed".to_string(),
            });
        }
        info!(branch = %branch, "Removing branch");
        self.git.delete_branch(branch.short_name())?;
        Ok(())
    }

    /// Check out `branch` and return a fresh snapshot of the current branch
    pub fn checkout(&self, branch: &Branch) -> Result<Branch> {
        self.git.checkout(branch.short_name())?;
        self.current_branch()?.ok_or(Error::NoCurrentBranch)
    }

    /// Hard-reset the checked-out branch to `target`'s tip
    pub fn reset_hard(&self, target: &Branch) -> Result<Branch> {
        let current = self.current_branch()?.ok_or(Error::NoCurrentBranch)?;
        let tip = target.object_id(self.git)?;
        info!(branch = %current, target = %target, "Resetting");
        self.git.reset_hard(&tip)?;
        Ok(current)
    }

    pub fn upstream(&self, branch: &Branch) -> Result<Option<Branch>> {
        let Some(UpstreamConfig { remote, merge }) = self.config.upstream(branch.short_name())?
        else {
            return Ok(None);
        };
        let simple = merge.strip_prefix(R_HEADS).unwrap_or(&merge);
        let name = if remote == "." {
            format!("{R_HEADS}{simple}")
        } else {
            format!("{R_REMOTES}{remote}/{simple}")
        };
        self.find_branch(&name)
    }

    pub fn set_upstream(&self, branch: &Branch, upstream: &Branch) -> Result<()> {
        let setting = match upstream.remote_name() {
            Some(remote) => UpstreamConfig {
                remote: remote.to_string(),
                merge: format!("{R_HEADS}{}", upstream.simple_name()),
            },
            None => UpstreamConfig {
                remote: ".".to_string(),
                merge: upstream.name().to_string(),
            },
        };
        self.config.set_upstream(branch.short_name(), &setting)
    }

    /// Look up `branch`'s counterpart on the configured remote
    pub fn remote_state(&self, branch: &Branch) -> Result<RemoteState> {
        let Some(remote) = self.remote_name()? else {
            return Ok(RemoteState::NoRemote);
        };
        let name = branch.remote_branch_name(&remote);
        match self.find_branch(&name)? {
            Some(remote_branch) => {
                let tip = remote_branch.object_id(self.git)?;
                Ok(RemoteState::Present {
                    remote,
                    branch: remote_branch,
                    tip,
                })
            }
            None => Ok(RemoteState::Absent { remote, name }),
        }
    }
}
