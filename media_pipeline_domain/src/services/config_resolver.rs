// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The config resolver: a pure merge of four configuration layers into a
//! frozen per-stage parameter set.
//!
//! Reading the layers themselves (`job.json`, the per-job `.env` file,
//! `config/.env.pipeline`, compiled defaults) is infrastructure's job -
//! this module only merges maps that are already in memory, keeping the
//! same separation between pure domain services and the I/O adapters
//! that feed them as the rest of this crate.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::value_objects::StageParameters;

/// Keys every stage may read regardless of its own recognized-key list,
/// e.g. `source_language`/`workflow`, matching §6's "recognized
/// parameters" list.
const GLOBAL_KEYS: &[&str] = &["source_language", "target_languages", "workflow"];

/// One configuration layer: a flat key -> value map plus a name used in
/// override provenance logging.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: &'static str,
    pub values: BTreeMap<String, Value>,
}

/// The merged result: a flat dictionary plus the set of keys that came
/// from a layer not recognized by any known stage (still preserved, only
/// warned about).
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub values: BTreeMap<String, Value>,
}

/// Merges layers in strict priority, highest first. `layers` must already
/// be ordered highest-priority-first by the caller (`job.json` layer,
/// then per-job `.env`, then system defaults, then compiled fallbacks).
pub fn resolve_layers(layers: &[ConfigLayer], known_keys: &[&str]) -> ResolvedConfig {
    let mut merged: BTreeMap<String, Value> = BTreeMap::new();
    // Iterate lowest priority first so later (higher priority) layers
    // overwrite, and each overwrite is logged with its true winning source.
    for layer in layers.iter().rev() {
        for (key, value) in &layer.values {
            let is_known = known_keys.contains(&key.as_str()) || GLOBAL_KEYS.contains(&key.as_str());
            if !is_known {
                tracing::warn!(key = %key, source = layer.source, "unknown configuration key; preserving");
            }
            match merged.get(key) {
                Some(old) if old != value => {
                    tracing::debug!(key = %key, old = %old, new = %value, source = layer.source, "configuration override");
                }
                None => {
                    tracing::debug!(key = %key, new = %value, source = layer.source, "configuration set");
                }
                _ => {}
            }
            merged.insert(key.clone(), value.clone());
        }
    }
    ResolvedConfig { values: merged }
}

/// Extracts the parameters relevant to one stage: the global keys plus
/// any key prefixed `"<stage>."`.
pub fn stage_view(resolved: &ResolvedConfig, stage_name: &str) -> StageParameters {
    let prefix = format!("{stage_name}.");
    resolved
        .values
        .iter()
        .filter(|(key, _)| GLOBAL_KEYS.contains(&key.as_str()) || key.starts_with(&prefix))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn higher_priority_layer_wins() {
        let layers = vec![
            ConfigLayer {
                source: "job.json",
                values: BTreeMap::from([("asr.model".to_string(), json!("large-v3"))]),
            },
            ConfigLayer {
                source: "compiled_defaults",
                values: BTreeMap::from([("asr.model".to_string(), json!("base"))]),
            },
        ];
        let resolved = resolve_layers(&layers, &["asr.model"]);
        assert_eq!(resolved.values.get("asr.model").unwrap(), &json!("large-v3"));
    }

    #[test]
    fn stage_view_filters_by_prefix() {
        let layers = vec![ConfigLayer {
            source: "job.json",
            values: BTreeMap::from([
                ("asr.model".to_string(), json!("large-v3")),
                ("vad.threshold".to_string(), json!(0.5)),
                ("workflow".to_string(), json!("transcribe")),
            ]),
        }];
        let resolved = resolve_layers(&layers, &["asr.model", "vad.threshold"]);
        let view = stage_view(&resolved, "asr");
        assert!(view.contains_key("asr.model"));
        assert!(view.contains_key("workflow"));
        assert!(!view.contains_key("vad.threshold"));
    }
}
