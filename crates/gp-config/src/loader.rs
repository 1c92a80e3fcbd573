// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Reading settings files and validating them against the schema

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value as J;

use crate::provenance::Scope;
use crate::schema::SchemaRoot;

/// Parse a TOML document into JSON for validation and merging
pub fn parse_toml_to_json(toml_str: &str) -> Result<J> {
    let value: toml::Value = toml_str.parse()?;
    Ok(serde_json::to_value(value)?)
}

fn validator() -> Result<&'static JSONSchema> {
    static VALIDATOR: OnceLock<JSONSchema> = OnceLock::new();
    if let Some(validator) = VALIDATOR.get() {
        return Ok(validator);
    }
    let schema = serde_json::to_value(schemars::schema_for!(SchemaRoot))?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema)
        .map_err(|e| anyhow::anyhow!("settings schema does not compile: {e}"))?;
    Ok(VALIDATOR.get_or_init(|| compiled))
}

pub fn validate_against_schema(v: &J) -> Result<()> {
    if let Err(errors) = validator()?.validate(v) {
        let message = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n  - ");
        anyhow::bail!("Config schema validation failed:\n  - {message}");
    }
    Ok(())
}

/// One settings source, already parsed and validated
#[derive(Debug, Clone)]
pub struct Layer {
    pub scope: Scope,
    pub json: J,
}

pub fn read_layer_from_file(path: &Path, scope: Scope) -> Result<Layer> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let json = parse_toml_to_json(&content)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    validate_against_schema(&json).with_context(|| format!("in {}", path.display()))?;
    Ok(Layer { scope, json })
}
