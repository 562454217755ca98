// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Loads the four configuration layers from disk/environment and hands
//! them to the domain's pure [`config_resolver`].

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, File, FileFormat};
use media_pipeline_domain::services::config_resolver::ConfigLayer;
use media_pipeline_domain::OrchestratorError;
use serde_json::Value;

/// Every configuration key a stage may legitimately read, across all
/// workflows - passed to [`media_pipeline_domain::services::config_resolver::resolve_layers`]
/// so a job-level override never logs as "unknown".
pub const KNOWN_CONFIG_KEYS: &[&str] = &[
    "vad.threshold",
    "vad.min_duration",
    "asr.model",
    "asr.backend",
    "asr.device",
    "asr.batch_size",
    "alignment.backend",
    "source_separation.enabled",
    "source_separation.quality",
    "translation.model",
    "translation.beam_size",
    "subtitle.format",
    "mux.burn_in",
    "tmdb.title",
    "tmdb.year",
];

/// Compiled-in fallback defaults, the lowest-priority layer.
pub fn compiled_defaults() -> ConfigLayer {
    let mut values = BTreeMap::new();
    values.insert("vad.threshold".to_string(), serde_json::json!(0.5));
    values.insert("vad.min_duration".to_string(), serde_json::json!(250));
    values.insert("asr.model".to_string(), serde_json::json!("base"));
    values.insert("asr.backend".to_string(), serde_json::json!("whisperx"));
    values.insert("asr.device".to_string(), serde_json::json!("auto"));
    values.insert("asr.batch_size".to_string(), serde_json::json!(8));
    values.insert("alignment.backend".to_string(), serde_json::json!("whisperx"));
    values.insert("source_separation.enabled".to_string(), serde_json::json!(false));
    values.insert("source_separation.quality".to_string(), serde_json::json!("standard"));
    values.insert("translation.model".to_string(), serde_json::json!("nllb-200"));
    values.insert("translation.beam_size".to_string(), serde_json::json!(5));
    values.insert("subtitle.format".to_string(), serde_json::json!("srt"));
    values.insert("mux.burn_in".to_string(), serde_json::json!(false));
    ConfigLayer {
        source: "compiled_defaults",
        values,
    }
}

/// Loads `config/.env.pipeline`, the system-wide default layer. A
/// missing file is not an error - it simply contributes no overrides.
pub fn load_system_env_layer(path: &Path) -> Result<ConfigLayer, OrchestratorError> {
    let values = if path.exists() {
        parse_dotenv(&std::fs::read_to_string(path)?)
    } else {
        BTreeMap::new()
    };
    Ok(ConfigLayer {
        source: "system_env",
        values,
    })
}

/// Loads a job's own `.job-<job_id>.env` file.
pub fn load_job_env_layer(path: &Path) -> Result<ConfigLayer, OrchestratorError> {
    let values = if path.exists() {
        parse_dotenv(&std::fs::read_to_string(path)?)
    } else {
        BTreeMap::new()
    };
    Ok(ConfigLayer {
        source: "job_env",
        values,
    })
}

/// Loads `job.json`, the highest-priority layer - explicit user choices
/// captured at `prepare-job` time. Uses the `config` crate's layered
/// builder so future additions (e.g. an optional `job.local.json`
/// override) only need another `add_source` call.
pub fn load_job_json_layer(path: &Path) -> Result<ConfigLayer, OrchestratorError> {
    let settings = Config::builder()
        .add_source(File::new(path.to_string_lossy().as_ref(), FileFormat::Json))
        .build()
        .map_err(|e| OrchestratorError::ConfigError(format!("loading job.json: {e}")))?;
    let parsed: Value = settings
        .try_deserialize()
        .map_err(|e| OrchestratorError::ConfigError(format!("parsing job.json: {e}")))?;
    let values = match parsed {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };
    Ok(ConfigLayer {
        source: "job_json",
        values,
    })
}

/// Minimal `KEY=value` dotenv parser; blank lines and `#` comments are
/// skipped. Values are parsed as JSON when possible (so `true`/`42`
/// round-trip as their native type), otherwise kept as strings.
fn parse_dotenv(contents: &str) -> BTreeMap<String, Value> {
    let mut values = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim();
            let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
            values.insert(key, parsed);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotenv_parses_typed_values() {
        let values = parse_dotenv("ASR_MODEL=large-v3\nSOURCE_SEPARATION_ENABLED=true\n# comment\n");
        assert_eq!(values.get("ASR_MODEL").unwrap(), &Value::String("large-v3".to_string()));
        assert_eq!(values.get("SOURCE_SEPARATION_ENABLED").unwrap(), &Value::Bool(true));
    }
}
