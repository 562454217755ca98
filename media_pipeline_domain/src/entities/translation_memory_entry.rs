// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `TranslationMemoryEntry` entity: a reusable prior translation,
//! keyed by `(source_text, target_lang, model_id)` with a
//! similarity-searchable index.

use serde::{Deserialize, Serialize};

/// A single prior translation kept for cross-job reuse. Not owned by any
/// job - it lives in the cross-job translation memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationMemoryEntry {
    pub source_text_normalized: String,
    pub target_lang: String,
    pub model_id: String,
    pub target_text: String,
    pub confidence: f64,
    /// Scopes reuse, e.g. a movie/title id, so translations from unrelated
    /// content don't leak into each other's memory.
    pub context_tag: Option<String>,
}

impl TranslationMemoryEntry {
    pub fn new(
        source_text_normalized: impl Into<String>,
        target_lang: impl Into<String>,
        model_id: impl Into<String>,
        target_text: impl Into<String>,
        confidence: f64,
        context_tag: Option<String>,
    ) -> Self {
        Self {
            source_text_normalized: source_text_normalized.into(),
            target_lang: target_lang.into(),
            model_id: model_id.into(),
            target_text: target_text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            context_tag,
        }
    }

    /// Checks whether this entry is an exact match for a lookup key,
    /// scoped by context tag when the lookup specifies one.
    pub fn exact_matches(&self, source_text_normalized: &str, target_lang: &str, model_id: &str, context_tag: Option<&str>) -> bool {
        self.source_text_normalized == source_text_normalized
            && self.target_lang == target_lang
            && self.model_id == model_id
            && context_tag.map(|tag| self.context_tag.as_deref() == Some(tag)).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_requires_all_keys() {
        let entry = TranslationMemoryEntry::new("hello", "hi", "nllb-200", "namaste", 0.95, Some("movie-42".into()));
        assert!(entry.exact_matches("hello", "hi", "nllb-200", Some("movie-42")));
        assert!(!entry.exact_matches("hello", "hi", "nllb-200", Some("movie-43")));
        assert!(!entry.exact_matches("goodbye", "hi", "nllb-200", None));
    }
}
