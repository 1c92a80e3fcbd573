// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a git backend
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not inside a git work tree: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Invalid object id: {0:?}")]
    InvalidObjectId(String),

    #[error("Invalid reference name {name:?}: {reason}")]
    InvalidRefName { name: String, reason: &'static str },

    #[error("Update of {name} rejected: {reason}")]
    RefUpdateRejected { name: String, reason: String },

    #[error("Unexpected output from `git {command}`: {output}")]
    UnexpectedOutput { command: String, output: String },
}

pub type GitResult<T> = std::result::Result<T, GitError>;
