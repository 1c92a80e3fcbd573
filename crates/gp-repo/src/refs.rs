// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Reference-name namespaces and validation

use crate::error::{GitError, GitResult};

pub const R_REFS: &str = "refs/";
pub const R_HEADS: &str = "refs/heads/";
pub const R_REMOTES: &str = "refs/remotes/";

/// Namespace holding the per-branch "last synced against" markers
pub const R_CONTROL: &str = "refs/gitProcess/";

/// Strip the well-known namespace prefix from a full reference name.
///
/// `refs/heads/feature` becomes `feature`, `refs/remotes/origin/feature`
/// becomes `origin/feature`. Names outside `refs/` are returned unchanged.
pub fn shorten(name: &str) -> &str {
    for prefix in [R_HEADS, R_REMOTES, R_REFS] {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest;
        }
    }
    name
}

/// Check a reference name against git's `check-ref-format` rules.
pub fn validate(name: &str) -> GitResult<()> {
    let reject = |reason| {
        Err(GitError::InvalidRefName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name == "@" {
        return reject("name is a lone '@'");
    }
    if name.chars().any(|c| c.is_ascii_control() || " ~^:?*[\\".contains(c)) {
        return reject("contains a forbidden character");
    }
    if name.contains("..") || name.contains("@{") || name.contains("//") {
        return reject("contains a forbidden sequence");
    }
    if name.starts_with('/') || name.ends_with('/') || name.ends_with('.') {
        return reject("has a forbidden leading or trailing character");
    }
    for component in name.split('/') {
        if component.starts_with('.') || component.ends_with(".lock") {
            return reject("has a component starting with '.' or ending with '.lock'");
        }
    }
    Ok(())
}
