// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Branch synchronization and safe-push engine.
//!
//! [`SyncOrchestrator`] sequences a sync: precondition checks, fetch, combine
//! with the integration branch ([`CombineStrategy`]), then a [`Reconciler`]
//! decides how the branch may be pushed and hands a configured [`Pusher`]
//! back. All git access goes through [`gp_repo::GitBackend`].

pub mod branch;
pub mod branches;
pub mod combine;
pub mod config;
pub mod error;
pub mod new_feature_branch;
pub mod push;
pub mod reconcile;
pub mod sync;
pub mod to_master;

#[cfg(test)]
mod testing;

pub use branch::Branch;
pub use branches::{BranchRepository, RemoteState, PARKING_BRANCH_NAME};
pub use combine::{CombineOutcome, CombineStrategy};
pub use config::{ConfigDefaults, ProcessConfig, UpstreamConfig};
pub use error::{Error, ErrorKind, Precondition, Result, SyncStep};
pub use new_feature_branch::new_feature_branch;
pub use push::{Hook, PushOutcome, Pusher};
pub use reconcile::{decide, PushDecision, PushPlan, Reconciler};
pub use sync::{PushSummary, SyncOptions, SyncOrchestrator, SyncReport};
pub use to_master::{to_master, ToMasterReport};
