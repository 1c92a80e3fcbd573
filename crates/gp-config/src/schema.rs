// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The canonical shape of a git-process settings file.
//!
//! Every layer is validated against the JSON schema generated from
//! [`SchemaRoot`]; the same type is the typed view handed to callers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    Plaintext,
    Json,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SchemaRoot {
    pub log_level: Option<LogLevelSetting>,
    pub log_format: Option<LogFormatSetting>,

    /// Fallback for `gitProcess.integrationBranch`
    pub integration_branch: Option<String>,
    /// Fallback for `gitProcess.remoteName`
    pub remote_name: Option<String>,
    /// Fallback for `gitProcess.defaultRebaseSync`
    pub default_rebase_sync: Option<bool>,
}

/// Top-level keys a settings layer may contain
pub fn known_keys() -> Vec<String> {
    let schema = schemars::schema_for!(SchemaRoot);
    schema
        .schema
        .object
        .map(|object| object.properties.keys().cloned().collect())
        .unwrap_or_default()
}
