// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `JsonManifestRepository`: persists a job's manifest as
//! `<job_dir>/manifest.json`, an initial job snapshot plus the full
//! append-only event log, written atomically via temp-file-plus-rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use media_pipeline_domain::aggregates::JobAggregate;
use media_pipeline_domain::entities::Job;
use media_pipeline_domain::events::JobEvent;
use media_pipeline_domain::repositories::ManifestRepository;
use media_pipeline_domain::{JobId, OrchestratorError};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize, Deserialize)]
struct ManifestFile {
    job: Job,
    events: Vec<JobEvent>,
}

pub struct JsonManifestRepository {
    jobs_root: PathBuf,
}

impl JsonManifestRepository {
    pub fn new(jobs_root: impl Into<PathBuf>) -> Self {
        Self {
            jobs_root: jobs_root.into(),
        }
    }

    fn manifest_path(&self, job_id: &JobId) -> PathBuf {
        let (year, month, day, user, seq) = job_id.directory_segments();
        self.jobs_root
            .join(year)
            .join(month)
            .join(day)
            .join(user)
            .join(seq)
            .join("manifest.json")
    }
}

#[async_trait]
impl ManifestRepository for JsonManifestRepository {
    async fn load(&self, job_id: &JobId) -> Result<Option<JobAggregate>, OrchestratorError> {
        let path = self.manifest_path(job_id);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let manifest: ManifestFile = serde_json::from_str(&contents)?;
        let aggregate = JobAggregate::from_events(manifest.job, manifest.events)?;
        Ok(Some(aggregate))
    }

    async fn save(&self, aggregate: &JobAggregate) -> Result<(), OrchestratorError> {
        let path = self.manifest_path(aggregate.job().id());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut events = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            let existing: ManifestFile = serde_json::from_str(&contents)?;
            existing.events
        } else {
            Vec::new()
        };
        events.extend(aggregate.uncommitted_events().iter().cloned());

        let manifest = ManifestFile {
            job: aggregate.job().clone(),
            events,
        };
        let serialized = serde_json::to_string_pretty(&manifest)?;

        write_atomic(&path, &serialized).await
    }

    async fn exists(&self, job_id: &JobId) -> Result<bool, OrchestratorError> {
        Ok(tokio::fs::try_exists(self.manifest_path(job_id)).await?)
    }
}

/// Writes `contents` to `path` by writing a sibling temp file and
/// renaming it into place, so a crash mid-write never leaves a
/// half-written manifest behind.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), OrchestratorError> {
    let tmp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
