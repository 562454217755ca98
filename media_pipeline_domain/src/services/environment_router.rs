// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The environment router: maps a stage to the isolated Python
//! environment that must execute it.
//!
//! Turns "many conflicting dependency sets" into a scheduling problem -
//! the router only needs a mapping from stage to interpreter; actually
//! locating and launching that interpreter is an infrastructure concern
//! (`app::infrastructure::runtime::subprocess_executor`).

use crate::error::OrchestratorError;
use crate::value_objects::EnvName;

use super::stage_registry;

/// The fixed set of isolated environments the router may resolve a stage
/// into.
pub const KNOWN_ENVIRONMENTS: &[&str] = &["common", "whisperx", "pyannote", "demucs", "indictrans2", "nllb", "llm", "mlx"];

/// Languages routed to the `indictrans2` environment rather than `nllb`
/// for translation, per the Indic-language translation model routing.
const INDIC_LANGUAGES: &[&str] = &["hi", "bn", "ta", "te", "mr", "gu", "kn", "ml", "pa", "ur", "or", "as"];

/// Resolves the environment for a registry-known stage.
pub fn env_for(stage: &str) -> Result<EnvName, OrchestratorError> {
    let env = stage_registry::env_for(stage)?;
    if !KNOWN_ENVIRONMENTS.contains(&env.as_str()) {
        return Err(OrchestratorError::InternalError(format!(
            "stage '{stage}' routed to unknown environment '{env}'"
        )));
    }
    Ok(env)
}

/// Picks the translation backend environment for a `(source, target)`
/// language pair: `indictrans2` when either side is an Indic language
/// recognized by that model family, `nllb` otherwise.
pub fn translation_env_for(source_language: Option<&str>, target_language: &str) -> EnvName {
    let source_is_indic = source_language.map(|s| INDIC_LANGUAGES.contains(&s)).unwrap_or(false);
    let target_is_indic = INDIC_LANGUAGES.contains(&target_language);
    if source_is_indic || target_is_indic {
        EnvName::new("indictrans2")
    } else {
        EnvName::new("nllb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hindi_to_english_routes_to_indictrans2() {
        assert_eq!(translation_env_for(Some("hi"), "en").as_str(), "indictrans2");
    }

    #[test]
    fn english_to_french_routes_to_nllb() {
        assert_eq!(translation_env_for(Some("en"), "fr").as_str(), "nllb");
    }

    #[test]
    fn asr_routes_to_whisperx() {
        assert_eq!(env_for("asr").unwrap().as_str(), "whisperx");
    }
}
