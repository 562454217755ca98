// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ports for the three cross-job cache layers. All caches are
//! opportunistic: a miss is never an error, and every hit is verified by
//! hash before use by the caller.

use async_trait::async_trait;

use crate::entities::TranslationMemoryEntry;
use crate::error::OrchestratorError;
use crate::value_objects::{Artifact, MediaFingerprint};

/// A reusable bundle of outputs from demux through alignment, keyed by
/// media fingerprint and tagged with the ASR model that produced it.
#[derive(Debug, Clone)]
pub struct BaselineCacheEntry {
    pub asr_model_tag: String,
    pub artifacts: Vec<Artifact>,
}

/// The media-fingerprint baseline cache.
#[async_trait]
pub trait BaselineCacheRepository: Send + Sync {
    /// Looks up a cached bundle for `fingerprint`. Returns `None` on a
    /// miss, or when the cached entry's ASR model tag doesn't match
    /// `required_asr_model_tag` (a stale model is treated as a miss, not
    /// an error).
    async fn lookup(
        &self,
        fingerprint: &MediaFingerprint,
        required_asr_model_tag: &str,
    ) -> Result<Option<BaselineCacheEntry>, OrchestratorError>;

    async fn store(&self, fingerprint: &MediaFingerprint, entry: BaselineCacheEntry) -> Result<(), OrchestratorError>;

    /// Persists the raw bytes of one cached artifact, addressed by the
    /// relative path it was recorded under in a prior job's stage output.
    async fn store_blob(
        &self,
        fingerprint: &MediaFingerprint,
        relative_path: &str,
        bytes: &[u8],
    ) -> Result<(), OrchestratorError>;

    /// Reads back the bytes stored by [`Self::store_blob`].
    async fn read_blob(&self, fingerprint: &MediaFingerprint, relative_path: &str) -> Result<Vec<u8>, OrchestratorError>;
}

/// The translation memory store.
#[async_trait]
pub trait TranslationMemoryRepository: Send + Sync {
    /// Exact match on `(source_text_normalized, target_lang, model_id)`,
    /// scoped by `context_tag` when present.
    async fn lookup_exact(
        &self,
        source_text_normalized: &str,
        target_lang: &str,
        model_id: &str,
        context_tag: Option<&str>,
    ) -> Result<Option<TranslationMemoryEntry>, OrchestratorError>;

    /// Nearest-neighbor lookup above `similarity_threshold` (spec default
    /// 0.80), scoped by `context_tag` when present.
    async fn lookup_similar(
        &self,
        source_text_normalized: &str,
        target_lang: &str,
        model_id: &str,
        context_tag: Option<&str>,
        similarity_threshold: f64,
    ) -> Result<Option<TranslationMemoryEntry>, OrchestratorError>;

    /// Stores an entry. Callers only persist translations that completed
    /// without validation errors.
    async fn store(&self, entry: TranslationMemoryEntry) -> Result<(), OrchestratorError>;

    /// Where this store lives on disk, if it is file-backed. Forwarded to
    /// the `translation` stage subprocess as an environment variable so an
    /// opaque third-party tool can read/update the store directly; `None`
    /// for in-memory or non-local implementations.
    fn store_location(&self) -> Option<&str> {
        None
    }
}

/// The YouTube download cache, keyed by canonical video id.
#[async_trait]
pub trait YoutubeCacheRepository: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<Option<Artifact>, OrchestratorError>;

    async fn store(&self, video_id: &str, artifact: Artifact) -> Result<(), OrchestratorError>;
}

/// Default similarity threshold for translation memory nearest-neighbor
/// lookups.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;
