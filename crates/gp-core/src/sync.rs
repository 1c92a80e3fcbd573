// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The `sync` workflow: preconditions, fetch, combine with the integration
//! branch, then reconcile with the remote branch and push.

use gp_repo::ObjectId;
use tracing::{debug, info, info_span};

use crate::branch::Branch;
use crate::branches::BranchRepository;
use crate::combine::{CombineOutcome, CombineStrategy};
use crate::error::{Error, Precondition, Result, SyncStep};
use crate::push::PushOutcome;
use crate::reconcile::{PushDecision, Reconciler};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub strategy: CombineStrategy,
    /// Skip fetching and pushing
    pub local_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushSummary {
    pub decision: PushDecision,
    /// Combines done while reconciling with the remote branch
    pub reconciled: Vec<CombineOutcome>,
    pub outcome: PushOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// Branch that was synced
    pub branch: Branch,
    /// Its tip once the sync finished
    pub tip: ObjectId,
    pub combine: CombineOutcome,
    /// `None` when nothing was pushed (local-only, or no remotes)
    pub push: Option<PushSummary>,
}

pub struct SyncOrchestrator<'r, 'g> {
    repo: &'r BranchRepository<'g>,
}

impl<'r, 'g> SyncOrchestrator<'r, 'g> {
    pub fn new(repo: &'r BranchRepository<'g>) -> Self {
        Self { repo }
    }

    /// Check everything `sync` needs without touching the repository.
    ///
    /// Returns the current branch and the integration branch.
    pub fn check_preconditions(&self) -> Result<(Branch, Branch)> {
        let current = self
            .repo
            .current_branch()?
            .ok_or(Error::PreconditionFailed(Precondition::NoCurrentBranch))?;
        let integration = self
            .repo
            .integration_branch()?
            .ok_or(Error::PreconditionFailed(Precondition::NoIntegrationBranch))?;
        if self.repo.on_parking()? {
            return Err(Error::PreconditionFailed(Precondition::OnParking));
        }
        if self.repo.git().has_uncommitted_changes()? {
            return Err(Error::PreconditionFailed(Precondition::UncommittedChanges));
        }
        Ok((current, integration))
    }

    pub fn sync(&self, options: SyncOptions) -> Result<SyncReport> {
        let git = self.repo.git();
        let (current, integration) = self.check_preconditions()?;
        let _span = info_span!("sync", branch = %current).entered();

        let remote = if options.local_only {
            None
        } else {
            self.repo.remote_name()?
        };

        if let Some(remote) = &remote {
            info!(%remote, "Fetching");
            let summary = git
                .fetch(remote)
                .map_err(|e| Error::from(e).at(SyncStep::Fetch))?;
            debug!(output = %summary.output, "Fetched");
        }

        let combine = options
            .strategy
            .combine(self.repo, &integration)
            .map_err(|e| e.at(SyncStep::Combine))?;

        let push = match remote {
            None => {
                info!("Not pushing: local-only sync or no remote");
                None
            }
            Some(_) => {
                let plan = Reconciler::new(self.repo, options.strategy)
                    .prepare(&current)
                    .map_err(|e| e.at(SyncStep::Reconcile))?;
                let outcome = plan
                    .pusher
                    .push(self.repo)
                    .map_err(|e| e.at(SyncStep::Push))?;
                Some(PushSummary {
                    decision: plan.decision,
                    reconciled: plan.combined,
                    outcome,
                })
            }
        };

        let tip = current.object_id(git)?;
        info!(tip = tip.abbrev(), "Sync complete");
        Ok(SyncReport {
            branch: current,
            tip,
            combine,
            push,
        })
    }
}
