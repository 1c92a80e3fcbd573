// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use gp_core::{
    new_feature_branch, to_master, BranchRepository, CombineStrategy, ConfigDefaults, ErrorKind,
    PushDecision, SyncOptions, SyncOrchestrator, PARKING_BRANCH_NAME,
};
use gp_repo::{GitBackend, GitCli, ObjectId};
use gp_test_utils::{git_available, init_test_tracing, GitFixture};

macro_rules! require_git {
    () => {
        init_test_tracing();
        if !git_available() {
            eprintln!("Git not available, skipping test");
            return;
        }
    };
}

fn oid(s: &str) -> ObjectId {
    ObjectId::parse(s).unwrap()
}

/// Fixture on a fresh `feature` branch with one commit on top of `master`
fn feature_fixture(test_name: &str) -> GitFixture {
    let fx = GitFixture::new(test_name);
    fx.git(&["checkout", "-q", "-b", "feature"]);
    fx.commit_file("feature.txt", "feature\n", "feature work");
    fx
}

fn sync(git: &GitCli, options: SyncOptions) -> gp_core::Result<gp_core::SyncReport> {
    let repo = BranchRepository::new(git, ConfigDefaults::default());
    SyncOrchestrator::new(&repo).sync(options)
}

#[test]
fn first_sync_pushes_and_records_the_marker() {
    require_git!();
    let fx = feature_fixture("first_sync_pushes_and_records_the_marker");
    let git = GitCli::open(fx.work_dir()).unwrap();

    let report = sync(&git, SyncOptions::default()).unwrap();
    let push = report.push.expect("sync with a remote pushes");
    assert_eq!(push.decision, PushDecision::RemoteAbsent);

    let tip = fx.rev("feature");
    assert_eq!(report.tip, oid(&tip));
    assert_eq!(fx.origin_rev("refs/heads/feature"), tip);
    assert_eq!(
        git.read_ref("refs/gitProcess/feature").unwrap(),
        Some(oid(&tip))
    );
}

#[test]
fn resync_without_changes_is_a_fast_forward() {
    require_git!();
    let fx = feature_fixture("resync_without_changes_is_a_fast_forward");
    let git = GitCli::open(fx.work_dir()).unwrap();
    sync(&git, SyncOptions::default()).unwrap();

    let last_synced = git.read_ref("refs/gitProcess/feature").unwrap();
    assert_eq!(
        last_synced,
        git.resolve_ref("refs/remotes/origin/feature").unwrap()
    );

    fx.commit_file("more.txt", "more\n", "more work");
    let report = sync(&git, SyncOptions::default()).unwrap();
    let push = report.push.unwrap();
    assert_eq!(push.decision, PushDecision::FastForward);
    assert_eq!(fx.origin_rev("refs/heads/feature"), fx.rev("feature"));
}

#[test]
fn rewritten_local_history_forces_over_unchanged_remote() {
    require_git!();
    let fx = feature_fixture("rewritten_local_history_forces_over_unchanged_remote");
    let git = GitCli::open(fx.work_dir()).unwrap();
    sync(&git, SyncOptions::default()).unwrap();

    fx.git(&["reset", "-q", "--hard", "master"]);
    fx.commit_file("feature.txt", "feature, take two\n", "reworked feature");

    let report = sync(&git, SyncOptions::default()).unwrap();
    let push = report.push.unwrap();
    assert_eq!(push.decision, PushDecision::ForceOverUnchangedRemote);
    assert!(push.reconciled.is_empty());
    assert_eq!(fx.origin_rev("refs/heads/feature"), fx.rev("feature"));
}

#[test]
fn peer_push_is_reconciled_before_forcing() {
    require_git!();
    let fx = feature_fixture("peer_push_is_reconciled_before_forcing");
    let git = GitCli::open(fx.work_dir()).unwrap();
    sync(&git, SyncOptions::default()).unwrap();

    let peer = fx.clone_origin();
    fx.git_in(peer.path(), &["checkout", "-q", "feature"]);
    let theirs = fx.commit_file_in(peer.path(), "peer.txt", "peer\n", "peer work");
    fx.git_in(peer.path(), &["push", "-q", "origin", "feature"]);

    let ours = fx.commit_file("mine.txt", "mine\n", "my work");

    let report = sync(&git, SyncOptions::default()).unwrap();
    let push = report.push.unwrap();
    assert_eq!(push.decision, PushDecision::Reconcile);
    assert_eq!(push.reconciled.len(), 2);

    let tip = oid(&fx.rev("feature"));
    assert!(git.ancestry_contains(&tip, &oid(&theirs)).unwrap());
    assert_ne!(tip, oid(&ours), "local work was replayed on top of the peer's");
    assert_eq!(fx.origin_rev("refs/heads/feature"), tip.as_str());
}

#[test]
fn merge_strategy_joins_with_a_merge_commit() {
    require_git!();
    let fx = feature_fixture("merge_strategy_joins_with_a_merge_commit");
    fx.git(&["checkout", "-q", "master"]);
    let mainline = fx.commit_file("main.txt", "main\n", "mainline work");
    fx.git(&["push", "-q", "origin", "master"]);
    fx.git(&["checkout", "-q", "feature"]);
    let git = GitCli::open(fx.work_dir()).unwrap();

    let report = sync(
        &git,
        SyncOptions {
            strategy: CombineStrategy::Merge,
            local_only: false,
        },
    )
    .unwrap();
    assert_eq!(report.combine.status, "Merged");
    assert!(git.ancestry_contains(&report.tip, &oid(&mainline)).unwrap());
    let parents = fx.git(&["rev-list", "--parents", "-n", "1", "HEAD"]);
    assert_eq!(parents.split_whitespace().count(), 3);
}

#[test]
fn dirty_tree_blocks_sync() {
    require_git!();
    let fx = feature_fixture("dirty_tree_blocks_sync");
    std::fs::write(fx.work_dir().join("feature.txt"), "uncommitted\n").unwrap();
    let before = fx.rev("feature");
    let git = GitCli::open(fx.work_dir()).unwrap();

    let err = sync(&git, SyncOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(err.to_string(), "You have uncommitted changes");
    assert_eq!(fx.rev("feature"), before);
    assert_eq!(git.resolve_ref("refs/remotes/origin/feature").unwrap(), None);
}

#[test]
fn local_only_repository_syncs_without_pushing() {
    require_git!();
    let fx = GitFixture::new_local_only("local_only_repository_syncs_without_pushing");
    fx.git(&["checkout", "-q", "-b", "feature"]);
    fx.commit_file("feature.txt", "feature\n", "feature work");
    fx.git(&["checkout", "-q", "master"]);
    let mainline = fx.commit_file("main.txt", "main\n", "mainline work");
    fx.git(&["checkout", "-q", "feature"]);
    let git = GitCli::open(fx.work_dir()).unwrap();

    let report = sync(&git, SyncOptions::default()).unwrap();
    assert_eq!(report.push, None);
    assert!(git.ancestry_contains(&report.tip, &oid(&mainline)).unwrap());
    assert_eq!(git.read_ref("refs/gitProcess/feature").unwrap(), None);
}

#[test]
fn new_feature_branch_starts_from_integration_and_tracks_it() {
    require_git!();
    let fx = GitFixture::new("new_feature_branch_starts_from_integration_and_tracks_it");
    let git = GitCli::open(fx.work_dir()).unwrap();
    let repo = BranchRepository::new(&git, ConfigDefaults::default());

    let branch = new_feature_branch(&repo, "topic", false).unwrap();
    assert_eq!(branch.name(), "refs/heads/topic");
    assert_eq!(git.head_ref().unwrap().as_deref(), Some("refs/heads/topic"));
    assert_eq!(fx.rev("topic"), fx.rev("origin/master"));

    let upstream = repo.upstream(&branch).unwrap().unwrap();
    assert_eq!(upstream.name(), "refs/remotes/origin/master");
}

#[test]
fn parking_is_created_lazily_at_the_integration_tip() {
    require_git!();
    let fx = GitFixture::new("parking_is_created_lazily_at_the_integration_tip");
    fx.git(&["checkout", "-q", "-b", "feature"]);
    fx.commit_file("feature.txt", "feature\n", "feature work");
    let git = GitCli::open(fx.work_dir()).unwrap();
    let repo = BranchRepository::new(&git, ConfigDefaults::default());
    let parking_ref = format!("refs/heads/{PARKING_BRANCH_NAME}");
    assert_eq!(git.resolve_ref(&parking_ref).unwrap(), None);

    let parking = repo.parking().unwrap();
    assert_eq!(parking.name(), parking_ref);
    assert_eq!(fx.rev(PARKING_BRANCH_NAME), fx.rev("origin/master"));
    assert_eq!(git.head_ref().unwrap().as_deref(), Some("refs/heads/feature"));

    // a second call finds the existing branch instead of recreating it
    fx.commit_file("more.txt", "more\n", "more work");
    assert_eq!(repo.parking().unwrap(), parking);
    assert_eq!(fx.rev(PARKING_BRANCH_NAME), fx.rev("origin/master"));
}

#[test]
fn new_feature_branch_from_parking_carries_unintegrated_work() {
    require_git!();
    let fx = GitFixture::new("new_feature_branch_from_parking_carries_unintegrated_work");
    fx.git(&["checkout", "-q", "-b", PARKING_BRANCH_NAME]);
    let parked = fx.commit_file("parked.txt", "parked\n", "parked work");
    let git = GitCli::open(fx.work_dir()).unwrap();
    let repo = BranchRepository::new(&git, ConfigDefaults::default());

    let branch = new_feature_branch(&repo, "topic", true).unwrap();
    assert_eq!(fx.rev("topic"), parked);
    assert_eq!(branch.short_name(), "topic");
    assert_eq!(
        git.resolve_ref(&format!("refs/heads/{PARKING_BRANCH_NAME}"))
            .unwrap(),
        None
    );
}

#[test]
fn to_master_lands_the_branch_on_the_integration_branch() {
    require_git!();
    let fx = feature_fixture("to_master_lands_the_branch_on_the_integration_branch");
    let git = GitCli::open(fx.work_dir()).unwrap();
    let repo = BranchRepository::new(&git, ConfigDefaults::default());

    let report = to_master(&repo, SyncOptions::default()).unwrap();
    assert!(report.integrated.success());
    assert_eq!(fx.origin_rev("refs/heads/master"), fx.rev("feature"));
}
