// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validated branch references.
//!
//! A [`Branch`] is an immutable snapshot of a name. Its tip is resolved live
//! on every call because branches move underneath us; once the reference is
//! deleted every tip lookup fails with [`Error::ReferenceGone`].

use std::fmt;

use gp_repo::refs::{self, R_CONTROL, R_HEADS, R_REFS, R_REMOTES};
use gp_repo::{GitBackend, GitResult, ObjectId};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Branch {
    name: String,
    remote: Option<String>,
}

impl Branch {
    /// Resolve a user-supplied name against the repository.
    ///
    /// Fails with [`Error::InvalidReference`] for malformed or unknown names.
    pub fn resolve(git: &dyn GitBackend, remotes: &[String], name: &str) -> Result<Branch> {
        Self::find(git, remotes, name)?.ok_or_else(|| Error::InvalidReference {
            name: name.to_string(),
            reason: "no such branch".to_string(),
        })
    }

    /// Like [`Branch::resolve`], but an unknown (well-formed) name is `None`
    pub fn find(git: &dyn GitBackend, remotes: &[String], name: &str) -> Result<Option<Branch>> {
        refs::validate(name).map_err(|e| Error::InvalidReference {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let full = qualify(name, remotes);
        Ok(git.resolve_ref(&full)?.map(|_| Self::from_full_name(full, remotes)))
    }

    pub(crate) fn from_full_name(name: String, remotes: &[String]) -> Branch {
        let remote = name.strip_prefix(R_REMOTES).map(|rest| remote_prefix(rest, remotes));
        Branch { name, remote }
    }

    /// Full reference name, e.g. `refs/heads/feature`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `feature` for a local branch, `origin/feature` for a remote one
    pub fn short_name(&self) -> &str {
        refs::shorten(&self.name)
    }

    /// The short name without any remote prefix
    pub fn simple_name(&self) -> &str {
        let short = self.short_name();
        match &self.remote {
            Some(remote) => short
                .strip_prefix(remote.as_str())
                .and_then(|s| s.strip_prefix('/'))
                .unwrap_or(short),
            None => short,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.remote.as_deref()
    }

    /// Name of this branch's counterpart on `remote`, e.g. `origin/feature`
    pub fn remote_branch_name(&self, remote: &str) -> String {
        format!("{remote}/{}", self.simple_name())
    }

    pub fn object_id(&self, git: &dyn GitBackend) -> Result<ObjectId> {
        git.resolve_ref(&self.name)?.ok_or_else(|| Error::ReferenceGone {
            name: self.name.clone(),
        })
    }

    pub fn sha(&self, git: &dyn GitBackend) -> Result<String> {
        Ok(self.object_id(git)?.abbrev().to_string())
    }

    /// Whether `oid` is anywhere in this branch's history
    pub fn contains(&self, git: &dyn GitBackend, oid: &ObjectId) -> Result<bool> {
        let tip = self.object_id(git)?;
        Ok(git.ancestry_contains(&tip, oid)?)
    }

    pub fn contains_all_of(&self, git: &dyn GitBackend, other: &Branch) -> Result<bool> {
        let other_tip = other.object_id(git)?;
        self.contains(git, &other_tip)
    }

    /// Reference holding the "last synced against" marker
    pub fn control_ref_name(&self) -> String {
        format!("{R_CONTROL}{}", self.short_name())
    }

    /// Remote tip observed at the last successful push, if ever synced
    pub fn last_synced_against(&self, git: &dyn GitBackend) -> Result<Option<ObjectId>> {
        Ok(git.read_ref(&self.control_ref_name())?)
    }

    pub fn record_last_synced_against(
        &self,
        git: &dyn GitBackend,
        oid: &ObjectId,
    ) -> GitResult<()> {
        git.update_ref(&self.control_ref_name(), oid, true)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Turn a user-supplied branch name into a full reference name.
///
/// `refs/...` is taken verbatim. Otherwise a name whose leading path
/// segments spell a configured remote (case-insensitively) is a
/// remote-tracking branch, rewritten to the remote's configured spelling,
/// and anything else is local.
pub fn qualify(name: &str, remotes: &[String]) -> String {
    if name.starts_with(R_REFS) {
        return name.to_string();
    }
    match matching_remote(name, remotes) {
        Some(remote) => format!("{R_REMOTES}{remote}{}", &name[remote.len()..]),
        None => format!("{R_HEADS}{name}"),
    }
}

/// Longest configured remote that `name` starts with as a path segment
fn matching_remote<'a>(name: &str, remotes: &'a [String]) -> Option<&'a String> {
    remotes
        .iter()
        .filter(|r| {
            name.len() > r.len() + 1
                && name.is_char_boundary(r.len())
                && name[..r.len()].eq_ignore_ascii_case(r)
                && name[r.len()..].starts_with('/')
        })
        .max_by_key(|r| r.len())
}

/// Configured remote prefixing `rest`, else its first path segment
fn remote_prefix(rest: &str, remotes: &[String]) -> String {
    match matching_remote(rest, remotes) {
        Some(remote) => remote.clone(),
        None => rest.split('/').next().unwrap_or(rest).to_string(),
    }
}
