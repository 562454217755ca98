// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The stage registry: the single source of truth for pipeline shape.
//!
//! No stage's internal code declares its own ordering - everything about
//! where a stage sits in the DAG, which environment runs it, and whether
//! it's required comes from this static table.

use once_cell::sync::Lazy;

use crate::error::OrchestratorError;
use crate::value_objects::{EnvName, StageName, StageOrder, WorkflowVariant};

/// A stage's static metadata: name, order, environment, dependencies,
/// required/optional, and which workflows it participates in.
pub struct StageDescriptor {
    pub name: &'static str,
    pub order: u8,
    pub env: &'static str,
    pub dependencies: &'static [&'static str],
    pub required: bool,
    pub workflows: &'static [WorkflowVariant],
    /// Default enablement predicate. Takes the set of optional stages the
    /// job explicitly enabled/disabled and returns whether this stage runs
    /// absent any per-job override.
    pub default_enabled: fn(&JobStageContext) -> bool,
    /// Stage parameter keys this stage requires to be present after
    /// config resolution; missing ones fail planning.
    pub required_parameter_keys: &'static [&'static str],
}

/// The inputs the registry's enablement predicates need, decoupled from
/// the `Job` entity so the registry stays a pure, dependency-free module.
#[derive(Debug, Clone, Default)]
pub struct JobStageContext {
    pub source_separation_requested: bool,
    pub tmdb_title_present: bool,
    pub ner_enabled: bool,
    pub source_language_equals_target: bool,
}

fn always_on(_ctx: &JobStageContext) -> bool {
    true
}

fn source_separation_enabled(ctx: &JobStageContext) -> bool {
    ctx.source_separation_requested
}

fn tmdb_enabled(ctx: &JobStageContext) -> bool {
    ctx.tmdb_title_present
}

fn ner_enabled(ctx: &JobStageContext) -> bool {
    ctx.ner_enabled
}

use WorkflowVariant::{Subtitle, Transcribe, Translate};

/// The static registry table. Order values occupy the 01-15 range; slot
/// 12 is the experimental NER stage, optional and off by default per the
/// design notes on "experimental" stages.
static REGISTRY: Lazy<Vec<StageDescriptor>> = Lazy::new(|| {
    vec![
        StageDescriptor {
            name: "demux",
            order: 1,
            env: "common",
            dependencies: &[],
            required: true,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "tmdb",
            order: 2,
            env: "common",
            dependencies: &[],
            required: false,
            workflows: &[Subtitle],
            default_enabled: tmdb_enabled,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "glossary",
            order: 3,
            env: "common",
            dependencies: &["tmdb"],
            required: false,
            workflows: &[Subtitle],
            default_enabled: tmdb_enabled,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "source_separation",
            order: 4,
            env: "demucs",
            dependencies: &["demux"],
            required: false,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: source_separation_enabled,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "pyannote_vad",
            order: 5,
            env: "pyannote",
            dependencies: &["demux", "source_separation"],
            required: true,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["vad.threshold", "vad.min_duration"],
        },
        StageDescriptor {
            name: "asr",
            order: 6,
            env: "whisperx",
            dependencies: &["pyannote_vad"],
            required: true,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["asr.model", "asr.backend"],
        },
        StageDescriptor {
            name: "alignment",
            order: 7,
            env: "whisperx",
            dependencies: &["asr"],
            required: true,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["alignment.backend"],
        },
        StageDescriptor {
            name: "lyrics_detection",
            order: 8,
            env: "llm",
            dependencies: &["alignment"],
            required: false,
            workflows: &[Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "hallucination_removal",
            order: 9,
            env: "llm",
            dependencies: &["alignment", "lyrics_detection"],
            required: false,
            workflows: &[Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "translation_prep",
            order: 10,
            env: "common",
            dependencies: &["alignment", "hallucination_removal"],
            required: true,
            workflows: &[Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["target_languages"],
        },
        StageDescriptor {
            name: "translation",
            order: 11,
            env: "nllb",
            dependencies: &["translation_prep"],
            required: true,
            workflows: &[Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["translation.model"],
        },
        StageDescriptor {
            name: "ner",
            order: 12,
            env: "llm",
            dependencies: &["alignment"],
            required: false,
            workflows: &[Transcribe, Translate, Subtitle],
            default_enabled: ner_enabled,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "translation_merge",
            order: 13,
            env: "common",
            dependencies: &["translation"],
            required: true,
            workflows: &[Translate, Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &[],
        },
        StageDescriptor {
            name: "subtitle_generation",
            order: 14,
            env: "common",
            dependencies: &["translation_merge", "alignment"],
            required: true,
            workflows: &[Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &["subtitle.format"],
        },
        StageDescriptor {
            name: "mux",
            order: 15,
            env: "common",
            dependencies: &["subtitle_generation"],
            required: true,
            workflows: &[Subtitle],
            default_enabled: always_on,
            required_parameter_keys: &[],
        },
    ]
});

/// Looks up a descriptor by name.
pub fn descriptor(name: &str) -> Option<&'static StageDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Every stage name the registry knows about, regardless of workflow or
/// enablement - used to pre-resolve per-stage configuration ahead of
/// planning, before the final stage list for a job is known.
pub fn all_stage_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|d| d.name).collect()
}

/// Direct input stages for `stage`, per the dependency list.
pub fn dependencies(stage: &str) -> Result<Vec<&'static str>, OrchestratorError> {
    let desc = descriptor(stage).ok_or_else(|| OrchestratorError::ConfigError(format!("unknown stage '{stage}'")))?;
    Ok(desc.dependencies.to_vec())
}

/// The isolated Python environment that must execute `stage`.
pub fn env_for(stage: &str) -> Result<EnvName, OrchestratorError> {
    let desc = descriptor(stage).ok_or_else(|| OrchestratorError::ConfigError(format!("unknown stage '{stage}'")))?;
    Ok(EnvName::new(desc.env))
}

/// Topological ordering of the stages applicable to `workflow` and
/// enabled by `ctx`, restricted to the workflow's dependency closure.
/// Ties break by numeric order (the table is already order-sorted, and
/// order values are globally unique, so a stable sort by `order` is
/// sufficient - no separate tie-break pass is needed).
pub fn stages_for(workflow: WorkflowVariant, ctx: &JobStageContext) -> Vec<(StageName, StageOrder, EnvName)> {
    let mut applicable: Vec<&StageDescriptor> = REGISTRY
        .iter()
        .filter(|d| d.workflows.contains(&workflow))
        .filter(|d| d.required || (d.default_enabled)(ctx))
        .collect();
    applicable.sort_by_key(|d| d.order);
    applicable
        .into_iter()
        .map(|d| {
            (
                StageName::new(d.name),
                StageOrder::new(d.order).expect("registry order values are always in range"),
                EnvName::new(d.env),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcribe_excludes_subtitle_only_stages() {
        let stages = stages_for(Transcribe, &JobStageContext::default());
        let names: Vec<&str> = stages.iter().map(|(n, _, _)| n.as_str()).collect();
        assert!(names.contains(&"demux"));
        assert!(names.contains(&"asr"));
        assert!(!names.contains(&"mux"));
        assert!(!names.contains(&"tmdb"));
    }

    #[test]
    fn translate_excludes_nllb_when_routed_through_translate_only() {
        let stages = stages_for(Translate, &JobStageContext::default());
        let names: Vec<&str> = stages.iter().map(|(n, _, _)| n.as_str()).collect();
        assert!(names.contains(&"translation"));
        assert!(!names.contains(&"mux"));
    }

    #[test]
    fn ner_is_off_by_default() {
        let stages = stages_for(Transcribe, &JobStageContext::default());
        let names: Vec<&str> = stages.iter().map(|(n, _, _)| n.as_str()).collect();
        assert!(!names.contains(&"ner"));
    }

    #[test]
    fn stage_order_is_monotonic() {
        let stages = stages_for(Subtitle, &JobStageContext { tmdb_title_present: true, source_separation_requested: true, ner_enabled: true, ..Default::default() });
        let orders: Vec<u8> = stages.iter().map(|(_, o, _)| o.get()).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn dependencies_lookup_matches_table() {
        assert_eq!(dependencies("asr").unwrap(), vec!["pyannote_vad"]);
    }

    #[test]
    fn unknown_stage_is_config_error() {
        assert!(dependencies("not_a_stage").is_err());
    }
}
