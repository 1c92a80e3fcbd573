// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered tool settings for git-process.
//!
//! Settings come from TOML files, `GIT_PROCESS_*` variables and command-line
//! flags, merged in the order system < user < repo < env < cli-config <
//! flags. Each layer is validated against the schema of [`SchemaRoot`]
//! before merging, and the winning layer of every key is kept for
//! `config show --show-origin`.
//!
//! Repository workflow settings (`gitProcess.*`) live in git config; the
//! values here only fill in for keys git config leaves unset.

pub mod env;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod provenance;
pub mod schema;

pub use paths::{discover_paths, Paths};
pub use provenance::{Provenance, Scope};
pub use schema::{LogFormatSetting, LogLevelSetting, SchemaRoot};

use anyhow::Result;
use serde_json::Value as J;

use crate::loader::Layer;

/// Merged settings plus where each value came from
#[derive(Debug, Clone)]
pub struct Resolved {
    pub json: J,
    pub provenance: Provenance,
}

impl Resolved {
    /// The typed view of the merged settings
    pub fn settings(&self) -> Result<SchemaRoot> {
        extract::get(&self.json)
    }
}

/// Load and merge every layer
pub fn load_all(paths: &Paths, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    let env_layer = env::env_overlay()?;
    load_with_env(paths, env_layer, flag_sets)
}

/// [`load_all`] with an explicit environment layer
pub fn load_with_env(paths: &Paths, env_layer: J, flag_sets: &[(&str, &str)]) -> Result<Resolved> {
    let file_layer = |path: Option<&std::path::Path>, scope: Scope| -> Result<Option<Layer>> {
        match path {
            Some(path) if path.exists() => loader::read_layer_from_file(path, scope).map(Some),
            _ => Ok(None),
        }
    };

    loader::validate_against_schema(&env_layer)
        .map_err(|e| e.context("in GIT_PROCESS_* environment variables"))?;
    let flags_layer = env::flags_overlay(flag_sets);
    loader::validate_against_schema(&flags_layer)
        .map_err(|e| e.context("in command-line settings"))?;

    let layers = [
        file_layer(Some(paths.system.as_path()), Scope::System)?,
        file_layer(Some(paths.user.as_path()), Scope::User)?,
        file_layer(paths.repo.as_deref(), Scope::Repo)?,
        Some(Layer {
            scope: Scope::Env,
            json: env_layer,
        }),
        file_layer(paths.cli_config.as_deref(), Scope::CliConfig)?,
        Some(Layer {
            scope: Scope::Flags,
            json: flags_layer,
        }),
    ];

    let mut json = serde_json::json!({});
    let mut provenance = Provenance::default();
    for layer in layers.into_iter().flatten() {
        provenance.record_layer(&layer.json, layer.scope);
        merge::merge_two_json(&mut json, layer.json);
    }

    Ok(Resolved { json, provenance })
}
