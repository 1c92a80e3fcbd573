// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use tracing::info;

use crate::branches::BranchRepository;
use crate::error::{Error, Precondition, Result, SyncStep};
use crate::push::{PushOutcome, Pusher};
use crate::sync::{SyncOptions, SyncOrchestrator, SyncReport};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToMasterReport {
    pub sync: SyncReport,
    /// The plain push onto the integration branch
    pub integrated: PushOutcome,
}

/// Sync the current branch, then push it onto the integration branch.
///
/// The final push is never forced; the server rejects it if the integration
/// branch moved after the sync.
pub fn to_master(repo: &BranchRepository<'_>, options: SyncOptions) -> Result<ToMasterReport> {
    let sync = SyncOrchestrator::new(repo).sync(SyncOptions {
        local_only: false,
        ..options
    })?;

    let integration = repo
        .integration_branch()?
        .ok_or(Error::PreconditionFailed(Precondition::NoIntegrationBranch))?;
    info!(branch = %sync.branch, onto = integration.simple_name(), "Pushing to integration branch");
    let integrated = Pusher::new(sync.branch.clone(), integration.simple_name(), false)
        .push(repo)
        .map_err(|e| e.at(SyncStep::Push))?;

    Ok(ToMasterReport { sync, integrated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDefaults;
    use crate::error::ErrorKind;
    use crate::testing::{oid, World};
    use gp_repo::{FetchSummary, PushReport, RebaseOutcome, RefUpdate, RefUpdateStatus};

    fn ok(destination: &str) -> PushReport {
        PushReport {
            remote: "origin".into(),
            updates: vec![RefUpdate {
                source: "refs/heads/feature".into(),
                destination: destination.into(),
                status: RefUpdateStatus::Ok,
            }],
        }
    }

    #[test]
    fn syncs_then_pushes_onto_mainline_without_force() {
        let mut git = World::new().into_mock();
        git.expect_fetch()
            .returning(|_| Ok(FetchSummary::default()));
        git.expect_rebase()
            .returning(|_| Ok(RebaseOutcome::UpToDate));
        git.expect_push()
            .withf(|_, spec, force| spec.destination == "refs/heads/feature" && !*force)
            .times(1)
            .returning(|_, spec, _| Ok(ok(&spec.destination)));
        git.expect_push()
            .withf(|_, spec, force| spec.destination == "refs/heads/master" && !*force)
            .times(1)
            .returning(|_, spec, _| Ok(ok(&spec.destination)));
        git.expect_update_ref()
            .times(1)
            .returning(|_, _, _| Ok(()));
        let repo = BranchRepository::new(&git, ConfigDefaults::default());

        let report = to_master(&repo, SyncOptions::default()).unwrap();
        assert_eq!(report.sync.tip, oid('f'));
        assert_eq!(report.integrated.recorded, None);
    }

    #[test]
    fn mainline_itself_is_refused() {
        let mut world = World::new();
        world.head = Some("refs/heads/master".into());
        let mut git = world.into_mock();
        git.expect_fetch()
            .returning(|_| Ok(FetchSummary::default()));
        git.expect_rebase()
            .returning(|_| Ok(RebaseOutcome::UpToDate));
        git.expect_push().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());

        let err = to_master(&repo, SyncOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RefusedMainlinePush);
    }
}
