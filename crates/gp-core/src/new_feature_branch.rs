// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use tracing::info;

use crate::branch::Branch;
use crate::branches::BranchRepository;
use crate::error::{Error, Precondition, Result};

/// Cut a new feature branch off the integration branch and check it out.
///
/// When called from the parking branch and parking holds work the
/// integration branch does not have yet, the new branch starts from parking
/// instead so that work is carried over. Parking is removed afterwards.
pub fn new_feature_branch(
    repo: &BranchRepository<'_>,
    name: &str,
    local_only: bool,
) -> Result<Branch> {
    let git = repo.git();
    let integration = repo
        .integration_branch()?
        .ok_or(Error::PreconditionFailed(Precondition::NoIntegrationBranch))?;

    let parking = if repo.on_parking()? {
        repo.current_branch()?
    } else {
        None
    };

    if !local_only {
        if let Some(remote) = repo.remote_name()? {
            info!(%remote, "Fetching");
            git.fetch(&remote)?;
        }
    }

    let base = match &parking {
        Some(parking) if !integration.contains_all_of(git, parking)? => {
            info!(%parking, "Parking has unintegrated work; using it as the base");
            parking.clone()
        }
        _ => integration.clone(),
    };

    let created = repo.create_branch(name, &base)?;
    let created = repo.checkout(&created)?;
    repo.set_upstream(&created, &integration)?;

    if let Some(parking) = parking {
        repo.remove_branch(&parking)?;
    }

    info!(branch = %created, base = %base, "Created feature branch");
    Ok(created)
}
