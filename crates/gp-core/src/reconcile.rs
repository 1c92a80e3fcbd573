// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Choosing between a fast-forward push, a force push, and re-combining with
//! the remote branch first.
//!
//! A force push is only chosen when the remote has not moved since the last
//! recorded sync, or right after the remote's current content has been
//! combined into the local branch.

use std::fmt;

use gp_repo::ObjectId;
use tracing::{debug, info};

use crate::branch::Branch;
use crate::branches::{BranchRepository, RemoteState};
use crate::combine::{CombineOutcome, CombineStrategy};
use crate::error::{Error, Precondition, Result};
use crate::push::Pusher;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushDecision {
    /// No remote counterpart exists; nothing to protect
    RemoteAbsent,
    /// Local history already contains the remote tip
    FastForward,
    /// Remote is exactly what was last synced; local history was rewritten
    ForceOverUnchangedRemote,
    /// Remote moved (or was never synced and diverged): combine, then force
    Reconcile,
}

impl PushDecision {
    pub fn force(self) -> bool {
        matches!(
            self,
            PushDecision::ForceOverUnchangedRemote | PushDecision::Reconcile
        )
    }
}

impl fmt::Display for PushDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PushDecision::RemoteAbsent => "remote branch absent; plain push",
            PushDecision::FastForward => "fast-forward push",
            PushDecision::ForceOverUnchangedRemote => "remote unchanged since last sync; force push",
            PushDecision::Reconcile => "remote diverged; reconcile then force push",
        })
    }
}

/// Decide how to push given the last synced tip and the live remote tip.
///
/// A remote that moved since the last recorded sync is always reconciled,
/// even when local history already contains its tip. `local_contains` is
/// only consulted when the remote is unchanged or was never synced.
pub fn decide(
    last_synced: Option<&ObjectId>,
    remote: Option<&ObjectId>,
    local_contains: impl FnOnce(&ObjectId) -> Result<bool>,
) -> Result<PushDecision> {
    let Some(remote) = remote else {
        return Ok(PushDecision::RemoteAbsent);
    };
    match last_synced {
        Some(last) if last != remote => Ok(PushDecision::Reconcile),
        Some(_) => Ok(if local_contains(remote)? {
            PushDecision::FastForward
        } else {
            PushDecision::ForceOverUnchangedRemote
        }),
        None => Ok(if local_contains(remote)? {
            PushDecision::FastForward
        } else {
            PushDecision::Reconcile
        }),
    }
}

/// What the reconciler did and the push it prepared
#[derive(Debug)]
pub struct PushPlan<'h> {
    pub decision: PushDecision,
    /// Combines performed while reconciling, remote first
    pub combined: Vec<CombineOutcome>,
    pub pusher: Pusher<'h>,
}

pub struct Reconciler<'r, 'g> {
    repo: &'r BranchRepository<'g>,
    strategy: CombineStrategy,
}

impl<'r, 'g> Reconciler<'r, 'g> {
    pub fn new(repo: &'r BranchRepository<'g>, strategy: CombineStrategy) -> Self {
        Self { repo, strategy }
    }

    /// Work out how `branch` must be pushed, combining with the remote
    /// branch (and then the integration branch) when it has diverged.
    pub fn prepare<'h>(&self, branch: &Branch) -> Result<PushPlan<'h>> {
        let git = self.repo.git();
        let (remote_branch, remote_tip) = match self.repo.remote_state(branch)? {
            RemoteState::NoRemote => return Err(Error::NoRemoteConfigured),
            RemoteState::Absent { remote, name } => {
                debug!(%remote, %name, "Remote branch does not exist");
                (None, None)
            }
            RemoteState::Present { branch, tip, .. } => (Some(branch), Some(tip)),
        };
        let last_synced = branch.last_synced_against(git)?;

        let decision = decide(last_synced.as_ref(), remote_tip.as_ref(), |oid| {
            branch.contains(git, oid)
        })?;
        info!(
            branch = %branch,
            remote = remote_tip.as_ref().map(|o| o.abbrev()).unwrap_or("-"),
            last_synced = last_synced.as_ref().map(|o| o.abbrev()).unwrap_or("-"),
            %decision,
            "Reconciled push"
        );

        let mut combined = Vec::new();
        if let (PushDecision::Reconcile, Some(remote_branch)) = (decision, &remote_branch) {
            combined.push(self.strategy.combine(self.repo, remote_branch)?);
            let integration = self
                .repo
                .integration_branch()?
                .ok_or(Error::PreconditionFailed(Precondition::NoIntegrationBranch))?;
            combined.push(self.strategy.combine(self.repo, &integration)?);
        }

        Ok(PushPlan {
            decision,
            combined,
            pusher: Pusher::new(branch.clone(), branch.simple_name(), decision.force()),
        })
    }
}
