// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the sync engine

use std::fmt;

use gp_repo::{GitError, PushReport};
use thiserror::Error;

use crate::combine::CombineStrategy;

pub type Result<T> = std::result::Result<T, Error>;

/// A sync precondition that did not hold. `Display` is the user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
    NoCurrentBranch,
    NoIntegrationBranch,
    OnParking,
    UncommittedChanges,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precondition::NoCurrentBranch => "Not currently on a branch",
            Precondition::NoIntegrationBranch => "There is no integration branch",
            Precondition::OnParking => "You can not do a sync while on _parking_",
            Precondition::UncommittedChanges => "You have uncommitted changes",
        })
    }
}

/// Sync stage an error came out of
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStep {
    Fetch,
    Combine,
    Reconcile,
    Push,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncStep::Fetch => "fetch",
            SyncStep::Combine => "combine with integration branch",
            SyncStep::Reconcile => "reconcile with remote branch",
            SyncStep::Push => "push",
        })
    }
}

/// Broad error categories callers can branch on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    PreconditionFailed,
    BackendFailure,
    CombineConflict,
    RefusedMainlinePush,
    NoRemoteConfigured,
    ReferenceGone,
    InvalidReference,
    HookFailed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    PreconditionFailed(Precondition),

    #[error(transparent)]
    Backend(#[from] GitError),

    #[error("{strategy} of {branch} with {base} did not complete: {status}")]
    CombineConflict {
        strategy: CombineStrategy,
        branch: String,
        base: String,
        status: String,
    },

    #[error("No branch is currently checked out")]
    NoCurrentBranch,

    #[error("Not pushing to the server because the current branch ({branch}) is the mainline branch")]
    RefusedMainlinePush { branch: String },

    #[error("Not pushing to the server because there is no remote")]
    NoRemoteConfigured,

    #[error("Branch reference {name} no longer exists")]
    ReferenceGone { name: String },

    #[error("\"{name}\" is not a usable branch: {reason}")]
    InvalidReference { name: String, reason: String },

    #[error("\"{0}\" already exists")]
    BranchAlreadyExists(String),

    #[error("Push was rejected: {report}")]
    PushRejected { report: PushReport },

    #[error("Pushed {branch}, but recording its sync marker failed: {source}")]
    ControlRefNotRecorded {
        branch: String,
        #[source]
        source: GitError,
    },

    #[error("{hook} hook failed: {source}")]
    HookFailed {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{step} failed: {source}")]
    AtStep {
        step: SyncStep,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Annotate with the sync step that produced this error
    pub fn at(self, step: SyncStep) -> Self {
        match self {
            already @ Error::AtStep { .. } => already,
            other => Error::AtStep {
                step,
                source: Box::new(other),
            },
        }
    }

    pub fn step(&self) -> Option<SyncStep> {
        match self {
            Error::AtStep { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The error with any step annotation peeled off
    pub fn root(&self) -> &Error {
        match self {
            Error::AtStep { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AtStep { source, .. } => source.kind(),
            Error::PreconditionFailed(_) | Error::NoCurrentBranch => ErrorKind::PreconditionFailed,
            Error::Backend(_) | Error::PushRejected { .. } | Error::ControlRefNotRecorded { .. } => {
                ErrorKind::BackendFailure
            }
            Error::CombineConflict { .. } => ErrorKind::CombineConflict,
            Error::RefusedMainlinePush { .. } => ErrorKind::RefusedMainlinePush,
            Error::NoRemoteConfigured => ErrorKind::NoRemoteConfigured,
            Error::ReferenceGone { .. } => ErrorKind::ReferenceGone,
            Error::InvalidReference { .. } | Error::BranchAlreadyExists(_) => {
                ErrorKind::InvalidReference
            }
            Error::HookFailed { .. } => ErrorKind::HookFailed,
        }
    }
}
