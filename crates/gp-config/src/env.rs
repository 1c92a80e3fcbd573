// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Overlays built from the environment and from command-line flags

use anyhow::Result;
use serde_json::{Map, Value as J};

pub const ENV_PREFIX: &str = "GIT_PROCESS";

/// `GIT_PROCESS_*` variables not holding settings
const RESERVED: &[&str] = &["home", "config"];

/// Settings from `GIT_PROCESS_*` variables; `GIT_PROCESS_LOG_LEVEL`
/// becomes `log-level`.
pub fn env_overlay() -> Result<J> {
    env_overlay_from(None)
}

/// Like [`env_overlay`], reading from `source` instead of the process
/// environment when given
pub fn env_overlay_from(source: Option<config::Map<String, String>>) -> Result<J> {
    let environment = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .convert_case(config::Case::Kebab)
        .try_parsing(true)
        .source(source);
    let built = config::Config::builder().add_source(environment).build()?;
    let mut map: Map<String, J> = built.try_deserialize()?;
    map.retain(|key, _| !RESERVED.contains(&key.as_str()));
    Ok(J::Object(map))
}

/// Settings given as `key=value` pairs on the command line
pub fn flags_overlay(pairs: &[(&str, &str)]) -> J {
    J::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), J::String(v.to_string())))
            .collect(),
    )
}
