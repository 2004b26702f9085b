//! Config discovery and fail-open loading.
//!
//! Loading flow:
//! 1. Probe `<project>/.primer/config.json`, `<project>/primer.config.json`,
//!    then `~/.primer/config.json`; first existing file wins.
//! 2. Deep-merge the parsed document over compiled defaults.
//! 3. Apply environment variable overrides (highest priority).
//!
//! Every failure falls open: a missing file, unreadable file, or malformed
//! JSON yields defaults rather than an error.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use primer_core::constants::{GLOBAL_CONFIG_PATH, PROJECT_CONFIG_PATHS};

use crate::errors::Result;
use crate::types::{InjectionMethod, SkillsConfig};

/// Candidate config paths for a project, highest priority first.
pub fn config_paths(project_dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = PROJECT_CONFIG_PATHS
        .iter()
        .map(|p| project_dir.join(p))
        .collect();
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    paths.push(PathBuf::from(home).join(GLOBAL_CONFIG_PATH));
    paths
}

/// Load the config for a project. Never fails.
pub fn load_config(project_dir: &Path) -> SkillsConfig {
    for path in config_paths(project_dir) {
        if path.is_file() {
            return load_config_from_path(&path);
        }
    }
    debug!("no config file found, using defaults");
    let mut config = SkillsConfig::default();
    apply_env_overrides(&mut config);
    config
}

/// Load the config from a specific file. Never fails.
///
/// Malformed JSON is treated as an empty config; a document that merges into
/// something undeserializable also yields defaults.
pub fn load_config_from_path(path: &Path) -> SkillsConfig {
    let user = match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable or malformed config, using defaults");
            Value::Object(serde_json::Map::new())
        }
    };

    let mut config = merge_over_defaults(user).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "config did not deserialize, using defaults");
        SkillsConfig::default()
    });

    debug!(path = %path.display(), skills = config.skills.len(), "loaded config");
    apply_env_overrides(&mut config);
    config
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn merge_over_defaults(user: Value) -> Result<SkillsConfig> {
    let defaults = serde_json::to_value(SkillsConfig::default())?;
    Ok(serde_json::from_value(deep_merge(defaults, user))?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to a loaded config.
///
/// Invalid values are ignored with a warning, falling back to file/default.
pub fn apply_env_overrides(config: &mut SkillsConfig) {
    if let Some(v) = read_env_u64("PRIMER_TOKEN_BUDGET", 1, 10_000_000) {
        config.settings.token_budget = Some(v);
    }
    if let Some(v) = read_env_bool("PRIMER_ANALYTICS") {
        config.settings.analytics = v;
    }
    if let Some(v) = read_env_bool("PRIMER_DEBUG") {
        config.settings.debug = v;
    }
    if let Ok(v) = std::env::var("PRIMER_INJECTION_METHOD") {
        match InjectionMethod::parse(&v) {
            Some(method) => config.settings.injection_method = method,
            None => warn!(value = %v, "invalid PRIMER_INJECTION_METHOD, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
