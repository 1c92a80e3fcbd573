// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Send a branch to the server and record what it was synced against.

use std::fmt;

use gp_repo::refs::R_HEADS;
use gp_repo::{ObjectId, PushReport, RefSpec};
use tracing::{debug, info, warn};

use crate::branch::Branch;
use crate::branches::BranchRepository;
use crate::error::{Error, Result};

/// Caller-supplied action run around the transfer
pub type Hook<'h> = Box<dyn FnOnce() -> anyhow::Result<()> + 'h>;

/// A configured push of one local branch
pub struct Pusher<'h> {
    local: Branch,
    remote_branch_name: String,
    force: bool,
    pre_push: Option<Hook<'h>>,
    post_push: Option<Hook<'h>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushOutcome {
    pub report: PushReport,
    /// Tip written to the branch's sync marker, when one was recorded
    pub recorded: Option<ObjectId>,
}

impl PushOutcome {
    pub fn success(&self) -> bool {
        self.report.success()
    }
}

impl<'h> Pusher<'h> {
    /// Push `local` to `remote_branch_name` (a simple name, no remote prefix)
    pub fn new(local: Branch, remote_branch_name: impl Into<String>, force: bool) -> Self {
        Self {
            local,
            remote_branch_name: remote_branch_name.into(),
            force,
            pre_push: None,
            post_push: None,
        }
    }

    pub fn with_pre_push(mut self, hook: impl FnOnce() -> anyhow::Result<()> + 'h) -> Self {
        self.pre_push = Some(Box::new(hook));
        self
    }

    /// Replaces the default sync-marker recording
    pub fn with_post_push(mut self, hook: impl FnOnce() -> anyhow::Result<()> + 'h) -> Self {
        self.post_push = Some(Box::new(hook));
        self
    }

    pub fn local(&self) -> &Branch {
        &self.local
    }

    pub fn remote_branch_name(&self) -> &str {
        &self.remote_branch_name
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn push(self, repo: &BranchRepository<'_>) -> Result<PushOutcome> {
        let git = repo.git();

        if let Some(integration) = repo.integration_branch()? {
            let mainline = integration.simple_name();
            if self.local.simple_name() == mainline && self.remote_branch_name == mainline {
                warn!(branch = %self.local, "Refusing to push the mainline branch onto itself");
                return Err(Error::RefusedMainlinePush {
                    branch: self.local.short_name().to_string(),
                });
            }
        }

        let remote = repo.remote_name()?.ok_or(Error::NoRemoteConfigured)?;

        if let Some(hook) = self.pre_push {
            hook().map_err(|source| Error::HookFailed {
                hook: "pre-push",
                source,
            })?;
        }

        let local_tip = self.local.object_id(git)?;
        let refspec = RefSpec::new(
            self.local.name(),
            format!("{R_HEADS}{}", self.remote_branch_name),
        );
        info!(
            %remote,
            %refspec,
            force = self.force,
            tip = local_tip.abbrev(),
            "Pushing"
        );
        let report = git.push(&remote, &refspec, self.force)?;
        if !report.success() {
            warn!(%report, "Push rejected");
            return Err(Error::PushRejected { report });
        }
        debug!(%report, "Push accepted");

        let recorded = match self.post_push {
            Some(hook) => {
                hook().map_err(|source| Error::HookFailed {
                    hook: "post-push",
                    source,
                })?;
                None
            }
            None if self.local.simple_name() == self.remote_branch_name => {
                self.local
                    .record_last_synced_against(git, &local_tip)
                    .map_err(|source| Error::ControlRefNotRecorded {
                        branch: self.local.short_name().to_string(),
                        source,
                    })?;
                debug!(branch = %self.local, tip = local_tip.abbrev(), "Recorded sync marker");
                Some(local_tip)
            }
            None => None,
        };

        Ok(PushOutcome { report, recorded })
    }
}

impl fmt::Debug for Pusher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pusher")
            .field("local", &self.local)
            .field("remote_branch_name", &self.remote_branch_name)
            .field("force", &self.force)
            .field("pre_push", &self.pre_push.is_some())
            .field("post_push", &self.post_push.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDefaults;
    use crate::error::ErrorKind;
    use crate::testing::{oid, World};
    use gp_repo::{GitError, RefUpdate, RefUpdateStatus};
    use mockall::predicate::{always, eq};
    use std::cell::Cell;

    fn report(status: RefUpdateStatus) -> PushReport {
        PushReport {
            remote: "origin".into(),
            updates: vec![RefUpdate {
                source: "refs/heads/feature".into(),
                destination: "refs/heads/feature".into(),
                status,
            }],
        }
    }

    #[test]
    fn mainline_onto_itself_is_refused_without_network() {
        let mut world = World::new();
        world.head = Some("refs/heads/master".into());
        let mut git = world.into_mock();
        git.expect_push().times(0);
        git.expect_update_ref().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let master = repo.branch("master").unwrap();

        let err = Pusher::new(master, "master", false).push(&repo).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RefusedMainlinePush);
        assert_eq!(
            err.to_string(),
            "Not pushing to the server because the current branch (master) is the mainline branch"
        );
    }

    #[test]
    fn no_remotes_fails_fast() {
        let mut git = World::local_only().into_mock();
        git.expect_push().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let err = Pusher::new(feature, "feature", false).push(&repo).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRemoteConfigured);
    }

    #[test]
    fn successful_push_records_sync_marker() {
        let mut git = World::new().into_mock();
        git.expect_push()
            .withf(|remote, spec, force| {
                remote == "origin"
                    && spec.to_string() == "refs/heads/feature:refs/heads/feature"
                    && *force
            })
            .times(1)
            .returning(|_, _, _| Ok(report(RefUpdateStatus::Ok)));
        git.expect_update_ref()
            .with(eq("refs/gitProcess/feature"), eq(oid('f')), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let outcome = Pusher::new(feature, "feature", true).push(&repo).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.recorded, Some(oid('f')));
    }

    #[test]
    fn push_to_another_name_does_not_record() {
        let mut git = World::new().into_mock();
        git.expect_push()
            .returning(|_, _, _| Ok(report(RefUpdateStatus::UpToDate)));
        git.expect_update_ref().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let outcome = Pusher::new(feature, "master", false).push(&repo).unwrap();
        assert_eq!(outcome.recorded, None);
    }

    #[test]
    fn rejection_carries_per_ref_detail_and_records_nothing() {
        let mut git = World::new().into_mock();
        git.expect_push()
            .returning(|_, _, _| Ok(report(RefUpdateStatus::Rejected("non-fast-forward".into()))));
        git.expect_update_ref().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let err = Pusher::new(feature, "feature", false).push(&repo).unwrap_err();
        match err {
            Error::PushRejected { report } => {
                assert_eq!(report.failures().count(), 1);
                assert!(report.to_string().contains("non-fast-forward"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failing_pre_push_hook_stops_the_transfer() {
        let mut git = World::new().into_mock();
        git.expect_push().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let err = Pusher::new(feature, "feature", false)
            .with_pre_push(|| anyhow::bail!("lint failed"))
            .push(&repo)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HookFailed);
        assert_eq!(err.to_string(), "pre-push hook failed: lint failed");
    }

    #[test]
    fn post_push_hook_replaces_marker_recording() {
        let ran = Cell::new(false);
        let mut git = World::new().into_mock();
        git.expect_push()
            .returning(|_, _, _| Ok(report(RefUpdateStatus::Ok)));
        git.expect_update_ref().times(0);
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let outcome = Pusher::new(feature, "feature", false)
            .with_post_push(|| {
                ran.set(true);
                Ok(())
            })
            .push(&repo)
            .unwrap();
        assert!(ran.get());
        assert_eq!(outcome.recorded, None);
    }

    #[test]
    fn marker_failure_is_distinct_from_push_failure() {
        let mut git = World::new().into_mock();
        git.expect_push()
            .returning(|_, _, _| Ok(report(RefUpdateStatus::Ok)));
        git.expect_update_ref()
            .with(always(), always(), always())
            .returning(|name, _, _| {
                Err(GitError::RefUpdateRejected {
                    name: name.to_string(),
                    reason: "lock held".into(),
                })
            });
        let repo = BranchRepository::new(&git, ConfigDefaults::default());
        let feature = repo.branch("feature").unwrap();

        let err = Pusher::new(feature, "feature", false).push(&repo).unwrap_err();
        assert!(matches!(err, Error::ControlRefNotRecorded { .. }));
        assert_eq!(err.kind(), ErrorKind::BackendFailure);
    }
}
