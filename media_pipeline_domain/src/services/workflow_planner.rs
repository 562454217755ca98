// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The workflow planner: pure, deterministic translation of
//! `(workflow, resolved config)` into an ordered execution plan.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::OrchestratorError;
use crate::value_objects::{EnvName, LanguageCode, StageName, StageParameters, WorkflowVariant};

use super::environment_router;
use super::stage_registry::{self, JobStageContext};

/// One stage in a resolved plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStage {
    pub stage_name: StageName,
    pub env_name: EnvName,
    pub parameters: StageParameters,
}

/// The ordered, filtered sequence of stages produced for a given
/// workflow and config.
pub type Plan = Vec<PlannedStage>;

/// Everything the planner needs, already resolved by the caller (the
/// config resolver and infrastructure I/O happen before this is built -
/// the planner itself never touches the filesystem or credential store).
#[derive(Debug, Clone)]
pub struct PlanningInput {
    pub workflow: WorkflowVariant,
    pub source_language: LanguageCode,
    pub target_languages: BTreeSet<String>,
    pub source_media_available: bool,
    pub required_credentials_available: bool,
    pub stage_ctx: JobStageContext,
    /// Per-stage resolved parameter snapshots, keyed by stage name.
    pub resolved_parameters: BTreeMap<String, StageParameters>,
}

/// Produces a plan for `input`. Pure and deterministic: identical inputs
/// always produce an identical plan.
pub fn plan(input: &PlanningInput) -> Result<Plan, OrchestratorError> {
    if !input.source_media_available {
        return Err(OrchestratorError::ConfigError(
            "source media path does not exist".to_string(),
        ));
    }
    if !input.required_credentials_available {
        return Err(OrchestratorError::CredentialMissing(
            "a required credential is absent for this workflow".to_string(),
        ));
    }

    let mut effective_workflow = input.workflow;
    let mut stage_ctx = input.stage_ctx.clone();

    if matches!(input.workflow, WorkflowVariant::Translate) {
        if input.target_languages.is_empty() {
            return Err(OrchestratorError::ConfigError(
                "translate workflow requires at least one target language".to_string(),
            ));
        }
        if let Some(source) = input.source_language.code() {
            if input.target_languages.len() == 1 && input.target_languages.contains(source) {
                tracing::warn!(
                    source_language = source,
                    "source language equals target language; downgrading translate workflow to transcribe"
                );
                effective_workflow = WorkflowVariant::Transcribe;
                stage_ctx.source_language_equals_target = true;
            }
        }
    }

    if matches!(effective_workflow, WorkflowVariant::Translate | WorkflowVariant::Subtitle)
        && input.target_languages.is_empty()
    {
        return Err(OrchestratorError::ConfigError(
            "no routing available: target language set is empty".to_string(),
        ));
    }

    let stages = stage_registry::stages_for(effective_workflow, &stage_ctx);
    let mut out = Vec::with_capacity(stages.len());
    for (stage_name, _order, env_name) in stages {
        let descriptor = stage_registry::descriptor(stage_name.as_str())
            .expect("stages_for only returns names present in the registry");
        let parameters = input
            .resolved_parameters
            .get(stage_name.as_str())
            .cloned()
            .unwrap_or_default();
        for required_key in descriptor.required_parameter_keys {
            if !parameters.contains_key(required_key) {
                return Err(OrchestratorError::ConfigError(format!(
                    "stage '{stage_name}' is missing required parameter '{required_key}'"
                )));
            }
        }
        let env_name = if stage_name.as_str() == "translation" {
            translation_environment(input.source_language.code(), &input.target_languages)
        } else {
            env_name
        };

        out.push(PlannedStage {
            stage_name,
            env_name,
            parameters,
        });
    }
    Ok(out)
}

/// Resolves the `translation` stage's environment for a (possibly
/// multi-target) job: routes to `indictrans2` when any target (or the
/// source) is an Indic language, `nllb` otherwise.
fn translation_environment(source_language: Option<&str>, target_languages: &BTreeSet<String>) -> EnvName {
    for target in target_languages {
        let env = environment_router::translation_env_for(source_language, target);
        if env.as_str() == "indictrans2" {
            return env;
        }
    }
    EnvName::new("nllb")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> PlanningInput {
        let mut resolved = BTreeMap::new();
        for (stage, keys) in [
            ("pyannote_vad", vec!["vad.threshold", "vad.min_duration"]),
            ("asr", vec!["asr.model", "asr.backend"]),
            ("alignment", vec!["alignment.backend"]),
        ] {
            let mut params = StageParameters::new();
            for key in keys {
                params.insert(key, serde_json::json!("value"));
            }
            resolved.insert(stage.to_string(), params);
        }
        PlanningInput {
            workflow: WorkflowVariant::Transcribe,
            source_language: LanguageCode::Auto,
            target_languages: BTreeSet::new(),
            source_media_available: true,
            required_credentials_available: true,
            stage_ctx: JobStageContext::default(),
            resolved_parameters: resolved,
        }
    }

    #[test]
    fn plan_is_deterministic() {
        let input = base_input();
        let first = plan(&input).unwrap();
        let second = plan(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_source_media_fails_planning() {
        let mut input = base_input();
        input.source_media_available = false;
        assert!(matches!(plan(&input), Err(OrchestratorError::ConfigError(_))));
    }

    #[test]
    fn missing_required_parameter_fails_planning() {
        let mut input = base_input();
        input.resolved_parameters.remove("asr");
        assert!(matches!(plan(&input), Err(OrchestratorError::ConfigError(_))));
    }

    #[test]
    fn source_equals_target_downgrades_translate_to_transcribe() {
        let mut input = base_input();
        input.workflow = WorkflowVariant::Translate;
        input.source_language = LanguageCode::parse("en").unwrap();
        input.target_languages.insert("en".to_string());
        let result = plan(&input).unwrap();
        let names: Vec<&str> = result.iter().map(|s| s.stage_name.as_str()).collect();
        assert!(!names.contains(&"translation"));
    }

    #[test]
    fn hindi_source_routes_translation_stage_to_indictrans2() {
        let mut input = base_input();
        input.workflow = WorkflowVariant::Translate;
        input.source_language = LanguageCode::parse("hi").unwrap();
        input.target_languages.insert("en".to_string());
        let mut params = StageParameters::new();
        params.insert("translation.model", serde_json::json!("value"));
        input.resolved_parameters.insert("translation_prep".to_string(), {
            let mut p = StageParameters::new();
            p.insert("target_languages", serde_json::json!(["en"]));
            p
        });
        input.resolved_parameters.insert("translation".to_string(), params);
        let result = plan(&input).unwrap();
        let translation = result.iter().find(|s| s.stage_name.as_str() == "translation").unwrap();
        assert_eq!(translation.env_name.as_str(), "indictrans2");
    }

    #[test]
    fn translate_without_targets_fails() {
        let mut input = base_input();
        input.workflow = WorkflowVariant::Translate;
        assert!(matches!(plan(&input), Err(OrchestratorError::ConfigError(_))));
    }
}
