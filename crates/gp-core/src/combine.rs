// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Merge or rebase the checked-out branch onto another one

use std::fmt;

use gp_repo::ObjectId;
use tracing::info;

use crate::branch::Branch;
use crate::branches::BranchRepository;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombineStrategy {
    /// Replay the current branch's commits onto the base
    #[default]
    Rebase,
    /// Join the current branch and the base with a merge commit
    Merge,
}

impl CombineStrategy {
    /// An explicit `--rebase`/`--merge` choice wins; otherwise the
    /// `defaultRebaseSync` preference decides.
    pub fn select(explicit: Option<CombineStrategy>, default_rebase_sync: bool) -> Self {
        explicit.unwrap_or(if default_rebase_sync {
            CombineStrategy::Rebase
        } else {
            CombineStrategy::Merge
        })
    }

    /// Combine the checked-out branch with `base`.
    ///
    /// Conflicts stop the operation and are returned as
    /// [`Error::CombineConflict`], leaving git's own in-progress state for the
    /// user to resolve or abort.
    pub fn combine(self, repo: &BranchRepository<'_>, base: &Branch) -> Result<CombineOutcome> {
        let git = repo.git();
        let current = repo.current_branch()?.ok_or(Error::NoCurrentBranch)?;
        let base_oid = base.object_id(git)?;

        let (successful, status) = match self {
            CombineStrategy::Rebase => {
                info!(branch = %current, onto = %base, "Rebasing");
                let outcome = git.rebase(&base_oid)?;
                (outcome.is_successful(), outcome.to_string())
            }
            CombineStrategy::Merge => {
                info!(branch = %current, base = %base, "Merging");
                let message = format!(
                    "Sync merge from {} into {}",
                    base.short_name(),
                    current.short_name()
                );
                let outcome = git.merge(&base_oid, &message)?;
                (outcome.is_successful(), outcome.to_string())
            }
        };

        if !successful {
            return Err(Error::CombineConflict {
                strategy: self,
                branch: current.short_name().to_string(),
                base: base.short_name().to_string(),
                status,
            });
        }

        let tip = current.object_id(git)?;
        info!(branch = %current, tip = tip.abbrev(), %status, "Combined");
        Ok(CombineOutcome {
            strategy: self,
            status,
            tip,
        })
    }
}

impl fmt::Display for CombineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CombineStrategy::Rebase => "Rebase",
            CombineStrategy::Merge => "Merge",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombineOutcome {
    pub strategy: CombineStrategy,
    /// Human-readable status as reported by git
    pub status: String,
    /// Tip of the current branch afterwards
    pub tip: ObjectId,
}
