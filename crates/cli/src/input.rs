//! Reading raw records from disk.
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON. Either way the
//! result is an untyped `serde_json::Value` handed to the validator unchanged.

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                InputFormat::Yaml
            }
            _ => InputFormat::Json,
        }
    }
}

pub fn parse_value(text: &str, format: InputFormat) -> anyhow::Result<Value> {
    let value = match format {
        InputFormat::Json => serde_json::from_str(text).context("invalid JSON")?,
        InputFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML")?,
    };
    Ok(value)
}

/// Load one raw record (or any raw value) from `path`.
pub fn load_value(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_value(&text, InputFormat::for_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Load a mapping of record id to raw record, keeping the ids.
pub fn load_roster(path: &Path) -> anyhow::Result<Vec<(String, Value)>> {
    match load_value(path)? {
        Value::Object(entries) => Ok(entries.into_iter().collect()),
        _ => bail!(
            "{} must contain a mapping of patient id to record",
            path.display()
        ),
    }
}
