// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed views over merged settings

use serde::de::DeserializeOwned;
use serde_json::Value as J;

/// Deserialize the whole settings document
pub fn get<T: DeserializeOwned>(root: &J) -> anyhow::Result<T> {
    serde_path_to_error::deserialize(root.clone())
        .map_err(|e| anyhow::anyhow!("Settings extraction failed at {}: {}", e.path(), e.inner()))
}

/// Deserialize the value at a dotted key; `None` when it is unset
pub fn get_at<T: DeserializeOwned>(root: &J, dotted: &str) -> anyhow::Result<Option<T>> {
    let mut cur = root;
    for part in dotted.split('.') {
        match cur.get(part) {
            Some(next) => cur = next,
            None => return Ok(None),
        }
    }
    serde_path_to_error::deserialize(cur.clone())
        .map(Some)
        .map_err(|e| anyhow::anyhow!("Setting '{dotted}' extraction failed: {}", e.inner()))
}
