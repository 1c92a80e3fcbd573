// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Git backend for git-process.
//!
//! The engine never talks to git directly. It consumes the [`GitBackend`]
//! capability set; [`GitCli`] provides it by driving the `git` executable.

pub mod backend;
pub mod error;
pub mod git_cli;
pub mod object_id;
pub mod refs;

pub use backend::{
    FetchSummary, GitBackend, MergeOutcome, PushReport, RebaseOutcome, RefSpec, RefUpdate,
    RefUpdateStatus,
};
#[cfg(any(test, feature = "mock"))]
pub use backend::MockGitBackend;
pub use error::{GitError, GitResult};
pub use git_cli::GitCli;
pub use object_id::ObjectId;
