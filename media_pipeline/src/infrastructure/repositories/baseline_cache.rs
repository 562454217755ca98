// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `FsBaselineCacheRepository`: one JSON file per fingerprint under
//! `<cache_root>/baseline/<fingerprint>.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::repositories::{BaselineCacheEntry, BaselineCacheRepository};
use media_pipeline_domain::value_objects::MediaFingerprint;
use media_pipeline_domain::OrchestratorError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    asr_model_tag: String,
    artifacts: Vec<media_pipeline_domain::value_objects::Artifact>,
}

pub struct FsBaselineCacheRepository {
    cache_root: PathBuf,
}

impl FsBaselineCacheRepository {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    fn path_for(&self, fingerprint: &MediaFingerprint) -> PathBuf {
        self.cache_root.join("baseline").join(format!("{}.json", fingerprint.to_hex()))
    }

    fn blob_path_for(&self, fingerprint: &MediaFingerprint, relative_path: &str) -> PathBuf {
        let sanitized = relative_path.replace("..", "_");
        self.cache_root
            .join("baseline")
            .join(fingerprint.to_hex())
            .join("blobs")
            .join(sanitized)
    }
}

#[async_trait]
impl BaselineCacheRepository for FsBaselineCacheRepository {
    async fn lookup(
        &self,
        fingerprint: &MediaFingerprint,
        required_asr_model_tag: &str,
    ) -> Result<Option<BaselineCacheEntry>, OrchestratorError> {
        let path = self.path_for(fingerprint);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let stored: StoredEntry = serde_json::from_str(&contents)?;
        if stored.asr_model_tag != required_asr_model_tag {
            return Ok(None);
        }
        Ok(Some(BaselineCacheEntry {
            asr_model_tag: stored.asr_model_tag,
            artifacts: stored.artifacts,
        }))
    }

    async fn store(&self, fingerprint: &MediaFingerprint, entry: BaselineCacheEntry) -> Result<(), OrchestratorError> {
        let path = self.path_for(fingerprint);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let stored = StoredEntry {
            asr_model_tag: entry.asr_model_tag,
            artifacts: entry.artifacts,
        };
        tokio::fs::write(&path, serde_json::to_vec_pretty(&stored)?).await?;
        Ok(())
    }

    async fn store_blob(&self, fingerprint: &MediaFingerprint, relative_path: &str, bytes: &[u8]) -> Result<(), OrchestratorError> {
        let path = self.blob_path_for(fingerprint, relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn read_blob(&self, fingerprint: &MediaFingerprint, relative_path: &str) -> Result<Vec<u8>, OrchestratorError> {
        let path = self.blob_path_for(fingerprint, relative_path);
        Ok(tokio::fs::read(&path).await?)
    }
}
