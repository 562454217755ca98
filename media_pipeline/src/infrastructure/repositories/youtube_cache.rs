// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `FsYoutubeCacheRepository`: one JSON sidecar file per canonical video
//! id recording the cached artifact's path and hash.

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::repositories::YoutubeCacheRepository;
use media_pipeline_domain::value_objects::Artifact;
use media_pipeline_domain::OrchestratorError;

pub struct FsYoutubeCacheRepository {
    cache_root: PathBuf,
}

impl FsYoutubeCacheRepository {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    fn path_for(&self, video_id: &str) -> PathBuf {
        self.cache_root.join("youtube").join(format!("{video_id}.json"))
    }
}

#[async_trait]
impl YoutubeCacheRepository for FsYoutubeCacheRepository {
    async fn lookup(&self, video_id: &str) -> Result<Option<Artifact>, OrchestratorError> {
        let path = self.path_for(video_id);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn store(&self, video_id: &str, artifact: Artifact) -> Result<(), OrchestratorError> {
        let path = self.path_for(video_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, serde_json::to_vec_pretty(&artifact)?).await?;
        Ok(())
    }
}
