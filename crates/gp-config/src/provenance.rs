// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Which layer set each setting

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as J;

/// Settings layers, lowest precedence first
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Scope {
    System,
    User,
    Repo,
    Env,
    CliConfig,
    Flags,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::System => "system",
            Scope::User => "user",
            Scope::Repo => "repo",
            Scope::Env => "env",
            Scope::CliConfig => "cli-config",
            Scope::Flags => "flags",
        })
    }
}

#[derive(Default, Clone, Debug)]
pub struct Provenance {
    /// Key to the layer whose value won
    pub winner: BTreeMap<String, Scope>,
    /// Key to every value it was given, in precedence order
    pub changes: BTreeMap<String, Vec<(Scope, J)>>,
}

impl Provenance {
    /// Record every non-null value `layer` sets
    pub fn record_layer(&mut self, layer: &J, scope: Scope) {
        self.record_at(layer, scope, "");
    }

    fn record_at(&mut self, value: &J, scope: Scope, prefix: &str) {
        match value {
            J::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    self.record_at(v, scope, &key);
                }
            }
            J::Null => {}
            _ => {
                self.winner.insert(prefix.to_string(), scope);
                self.changes
                    .entry(prefix.to_string())
                    .or_default()
                    .push((scope, value.clone()));
            }
        }
    }
}
