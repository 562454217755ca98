// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `FsTranslationMemoryRepository`: a flat append-only JSON Lines file of
//! [`TranslationMemoryEntry`] records, scanned linearly on lookup. A
//! A simple store matching the scale this system actually needs
//! (per-user/job translation reuse, not a global corpus needing an
//! index).

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::entities::TranslationMemoryEntry;
use media_pipeline_domain::repositories::TranslationMemoryRepository;
use media_pipeline_domain::OrchestratorError;
use tokio::io::AsyncWriteExt;

pub struct FsTranslationMemoryRepository {
    store_path: PathBuf,
}

impl FsTranslationMemoryRepository {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    async fn read_all(&self) -> Result<Vec<TranslationMemoryEntry>, OrchestratorError> {
        if !tokio::fs::try_exists(&self.store_path).await? {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&self.store_path).await?;
        let mut entries = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }
}

/// Naive string similarity used for nearest-neighbor lookups: the
/// fraction of matching characters at corresponding positions relative
/// to the longer string's length. Adequate for the opportunistic reuse
/// the cache targets; not a substitute for an embedding-based index.
fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let matches = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    matches as f64 / max_len as f64
}

#[async_trait]
impl TranslationMemoryRepository for FsTranslationMemoryRepository {
    async fn lookup_exact(
        &self,
        source_text_normalized: &str,
        target_lang: &str,
        model_id: &str,
        context_tag: Option<&str>,
    ) -> Result<Option<TranslationMemoryEntry>, OrchestratorError> {
        let entries = self.read_all().await?;
        Ok(entries
            .into_iter()
            .find(|e| e.exact_matches(source_text_normalized, target_lang, model_id, context_tag)))
    }

    async fn lookup_similar(
        &self,
        source_text_normalized: &str,
        target_lang: &str,
        model_id: &str,
        context_tag: Option<&str>,
        similarity_threshold: f64,
    ) -> Result<Option<TranslationMemoryEntry>, OrchestratorError> {
        let entries = self.read_all().await?;
        let mut best: Option<(f64, TranslationMemoryEntry)> = None;
        for entry in entries {
            if entry.target_lang != target_lang || entry.model_id != model_id {
                continue;
            }
            if let Some(tag) = context_tag {
                if entry.context_tag.as_deref() != Some(tag) {
                    continue;
                }
            }
            let score = similarity(source_text_normalized, &entry.source_text_normalized);
            if score >= similarity_threshold && best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
                best = Some((score, entry));
            }
        }
        Ok(best.map(|(_, entry)| entry))
    }

    async fn store(&self, entry: TranslationMemoryEntry) -> Result<(), OrchestratorError> {
        if let Some(parent) = self.store_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.store_path)
            .await?;
        let line = serde_json::to_string(&entry)?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    fn store_location(&self) -> Option<&str> {
        self.store_path.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_similarity_one() {
        assert_eq!(similarity("hello world", "hello world"), 1.0);
    }

    #[test]
    fn wholly_different_strings_have_low_similarity() {
        assert!(similarity("hello", "zzzzz") < 0.2);
    }
}
