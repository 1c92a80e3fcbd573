// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The capability set the sync engine consumes from git.

use std::fmt;

use crate::error::GitResult;
use crate::object_id::ObjectId;

/// `source:destination` pair handed to a push
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefSpec {
    pub source: String,
    pub destination: String,
}

impl RefSpec {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.destination)
    }
}

/// What the server said about one pushed reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefUpdateStatus {
    Ok,
    UpToDate,
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefUpdate {
    pub source: String,
    pub destination: String,
    pub status: RefUpdateStatus,
}

impl RefUpdate {
    pub fn is_successful(&self) -> bool {
        matches!(self.status, RefUpdateStatus::Ok | RefUpdateStatus::UpToDate)
    }
}

/// Per-reference result of a push
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushReport {
    pub remote: String,
    pub updates: Vec<RefUpdate>,
}

impl PushReport {
    /// True when every updated reference is `Ok` or `UpToDate`
    pub fn success(&self) -> bool {
        self.updates.iter().all(RefUpdate::is_successful)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RefUpdate> {
        self.updates.iter().filter(|u| !u.is_successful())
    }
}

impl fmt::Display for PushReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for update in &self.updates {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            let status = match &update.status {
                RefUpdateStatus::Ok => "ok".to_string(),
                RefUpdateStatus::UpToDate => "up to date".to_string(),
                RefUpdateStatus::Rejected(reason) => format!("rejected ({reason})"),
            };
            write!(f, "{} -> {} on {}: {}", update.source, update.destination, self.remote, status)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub remote: String,
    /// Progress and ref-update lines as printed by git
    pub output: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    FastForward,
    AlreadyUpToDate,
    Merged,
    /// Stopped with conflicts; the merge is left in progress for the user
    Conflicting,
}

impl MergeOutcome {
    pub fn is_successful(self) -> bool {
        !matches!(self, MergeOutcome::Conflicting)
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergeOutcome::FastForward => "Fast-forward",
            MergeOutcome::AlreadyUpToDate => "Already up-to-date",
            MergeOutcome::Merged => "Merged",
            MergeOutcome::Conflicting => "Conflicting",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebaseOutcome {
    Ok,
    UpToDate,
    FastForward,
    /// Stopped on a conflicting commit; the rebase is left in progress
    Stopped,
}

impl RebaseOutcome {
    pub fn is_successful(self) -> bool {
        !matches!(self, RebaseOutcome::Stopped)
    }
}

impl fmt::Display for RebaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RebaseOutcome::Ok => "Rebase successful",
            RebaseOutcome::UpToDate => "Already up-to-date",
            RebaseOutcome::FastForward => "Fast-forward",
            RebaseOutcome::Stopped => {
                "Stopped due to a conflict; must either abort or resolve or skip"
            }
        })
    }
}

/// Git operations needed by the branch sync engine.
///
/// Names passed in are either full reference names (`refs/heads/x`) or
/// anything `git rev-parse` understands; object ids are always full.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait GitBackend {
    /// Resolve any revision to the commit it names; `None` when unknown
    fn resolve_ref(&self, name: &str) -> GitResult<Option<ObjectId>>;

    /// Read an exact reference without peeling or DWIM lookup
    fn read_ref(&self, name: &str) -> GitResult<Option<ObjectId>>;

    /// Point `name` at `new_oid`. Without `force` the update must be a
    /// fast-forward of the current value and is applied compare-and-swap.
    fn update_ref(&self, name: &str, new_oid: &ObjectId, force: bool) -> GitResult<()>;

    /// Full reference HEAD points to, or `None` when detached
    fn head_ref(&self) -> GitResult<Option<String>>;

    /// Full names of local and remote-tracking branches
    fn list_branches(&self) -> GitResult<Vec<String>>;

    fn remote_names(&self) -> GitResult<Vec<String>>;

    fn fetch(&self, remote: &str) -> GitResult<FetchSummary>;

    /// Merge `base` into the checked-out branch
    fn merge(&self, base: &ObjectId, message: &str) -> GitResult<MergeOutcome>;

    /// Replay the checked-out branch onto `onto`
    fn rebase(&self, onto: &ObjectId) -> GitResult<RebaseOutcome>;

    fn push(&self, remote: &str, refspec: &RefSpec, force: bool) -> GitResult<PushReport>;

    /// Tracked changes in the index or work tree
    fn has_uncommitted_changes(&self) -> GitResult<bool>;

    /// Whether `target` is reachable from `tip` through any parent edge
    fn ancestry_contains(&self, tip: &ObjectId, target: &ObjectId) -> GitResult<bool>;

    fn create_branch(&self, name: &str, start_point: &ObjectId) -> GitResult<()>;

    fn delete_branch(&self, name: &str) -> GitResult<()>;

    fn checkout(&self, name: &str) -> GitResult<()>;

    fn reset_hard(&self, target: &ObjectId) -> GitResult<()>;

    fn config_get(&self, key: &str) -> GitResult<Option<String>>;

    fn config_set(&self, key: &str, value: &str) -> GitResult<()>;
}
