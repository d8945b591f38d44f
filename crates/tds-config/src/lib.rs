//! tds-config
//!
//! Layered YAML configuration for the retag driver.
//!
//! Layers are merged in order (earlier = base, later = override) as JSON
//! values, then deserialized into [`RetagConfig`]. Unknown keys are an error:
//! a typo in a policy key must not silently fall back to the default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

use tds_reconcile::ReconcileOptions;

/// Environment variable holding extra config paths (platform path-list syntax).
pub const ENV_CONFIG: &str = "TDS_RETAG_CONFIG";

/// What the process exit status says about a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Exit 1 when any path failed.
    #[default]
    FailOnError,
    /// Exit 0 no matter what (historical behavior).
    AlwaysZero,
}

impl ExitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitPolicy::FailOnError => "fail_on_error",
            ExitPolicy::AlwaysZero => "always_zero",
        }
    }

    pub fn exit_code(&self, failed: usize) -> u8 {
        match self {
            ExitPolicy::FailOnError if failed > 0 => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Trim surrounding whitespace from each path before processing.
    pub strip_whitespace: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            strip_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetagConfig {
    pub exit_policy: ExitPolicy,
    /// Warn when several files in a directory share one timestamp code.
    pub warn_shared_timestamp: bool,
    pub input: InputConfig,
}

impl Default for RetagConfig {
    fn default() -> Self {
        Self {
            exit_policy: ExitPolicy::default(),
            warn_shared_timestamp: true,
            input: InputConfig::default(),
        }
    }
}

impl RetagConfig {
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            warn_shared_timestamp: self.warn_shared_timestamp,
        }
    }

    /// Normalize one raw input line/argument into a path, or `None` if blank.
    pub fn normalize_input<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let s = if self.input.strip_whitespace {
            raw.trim()
        } else {
            raw.trim_end_matches(['\r', '\n'])
        };
        (!s.is_empty()).then_some(s)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RetagConfig,
    /// Paths of the layers that were merged, in order.
    pub layers: Vec<String>,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    let mut loaded = load_layered_yaml_from_strings(&doc_refs)?;
    loaded.layers = paths.iter().map(|p| p.to_string()).collect();
    Ok(loaded)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty document is an empty layer, not a reset to null.
        if v_json.is_null() {
            continue;
        }
        merged = deep_merge(merged, v_json);
    }

    let config: RetagConfig =
        serde_json::from_value(merged).context("invalid tds-retag config")?;
    Ok(LoadedConfig {
        config,
        layers: Vec::new(),
    })
}

/// Config paths listed in [`ENV_CONFIG`], in order.
pub fn config_paths_from_env() -> Vec<String> {
    match std::env::var_os(ENV_CONFIG) {
        Some(v) => std::env::split_paths(&v)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        None => Vec::new(),
    }
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}
