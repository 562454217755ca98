// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `FsJobDirectoryPort`: lays out `out/YYYY/MM/DD/<user>/<seq>/` the way
//! `prepare-job` and `run-pipeline` both expect to find it - `job.json`,
//! the merged `.env`, `logs/`, and per-stage config snapshots.

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::{Artifact, ContentHash, Job, JobId, OrchestratorError, StageParameters, UserId};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::application::ports::JobDirectoryPort;
use crate::infrastructure::runtime::next_sequence;

pub struct FsJobDirectoryPort {
    output_root: PathBuf,
}

impl FsJobDirectoryPort {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    fn job_dir(&self, job_id: &JobId) -> PathBuf {
        let (year, month, day, user, seq) = job_id.directory_segments();
        self.output_root.join(year).join(month).join(day).join(user).join(seq)
    }

    fn sequence_counter_path(&self, date: &str, user: &UserId) -> PathBuf {
        self.output_root.join(".sequences").join(format!("{date}-{user}.count"))
    }
}

#[async_trait]
impl JobDirectoryPort for FsJobDirectoryPort {
    async fn allocate_job_id(&self, date: &str, user: &UserId) -> Result<JobId, OrchestratorError> {
        let counter_path = self.sequence_counter_path(date, user);
        if let Some(parent) = counter_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let seq = next_sequence(&counter_path)?;
        JobId::new(date, user.to_string(), seq)
    }

    async fn materialize(&self, job: &Job, env_contents: &str) -> Result<String, OrchestratorError> {
        let dir = self.job_dir(job.id());
        tokio::fs::create_dir_all(dir.join("logs")).await?;
        tokio::fs::create_dir_all(dir.join("config")).await?;

        let job_json = serde_json::to_string_pretty(job)?;
        let result: Result<(), OrchestratorError> = async {
            tokio::fs::write(dir.join("job.json"), job_json).await?;
            tokio::fs::write(dir.join(format!(".job-{}.env", job.id())), env_contents).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(e);
        }

        Ok(dir.to_string_lossy().into_owned())
    }

    fn job_root(&self, job_id: &JobId) -> String {
        self.job_dir(job_id).to_string_lossy().into_owned()
    }

    async fn load_stage_parameters(&self, job_id: &JobId, stage_name: &str) -> Result<StageParameters, OrchestratorError> {
        let path = self.job_dir(job_id).join("config").join(format!("{stage_name}.json"));
        if !tokio::fs::try_exists(&path).await? {
            return Ok(StageParameters::new());
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let value: Value = serde_json::from_str(&contents)?;
        let params = match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => StageParameters::new(),
        };
        Ok(params)
    }

    fn config_snapshot_path(&self, job_id: &JobId, stage_name: &str) -> String {
        self.job_dir(job_id)
            .join("config")
            .join(format!("{stage_name}.json"))
            .to_string_lossy()
            .into_owned()
    }

    fn stage_output_dir(&self, job_id: &JobId, stage_name: &str, order: u8) -> String {
        self.job_dir(job_id)
            .join(format!("{order:02}_{stage_name}"))
            .to_string_lossy()
            .into_owned()
    }

    async fn read_job_file(&self, job_id: &JobId, relative_path: &str) -> Result<Vec<u8>, OrchestratorError> {
        let path = self.job_dir(job_id).join(relative_path);
        Ok(tokio::fs::read(&path).await?)
    }

    async fn job_file_exists(&self, job_id: &JobId, relative_path: &str) -> Result<bool, OrchestratorError> {
        let path = self.job_dir(job_id).join(relative_path);
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn write_job_file(&self, job_id: &JobId, relative_path: &str, bytes: &[u8]) -> Result<(), OrchestratorError> {
        let path = self.job_dir(job_id).join(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn write_stage_parameters(
        &self,
        job_id: &JobId,
        stage_name: &str,
        parameters: &StageParameters,
    ) -> Result<(), OrchestratorError> {
        let dir = self.job_dir(job_id).join("config");
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{stage_name}.json"));
        let map: serde_json::Map<String, Value> = parameters.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(serde_json::to_string_pretty(&Value::Object(map))?.as_bytes()).await?;
        Ok(())
    }

    async fn prepare_stage_output_dir(&self, job_id: &JobId, stage_name: &str, order: u8) -> Result<String, OrchestratorError> {
        let dir = self.job_dir(job_id).join(format!("{order:02}_{stage_name}"));
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir.to_string_lossy().into_owned())
    }

    async fn collect_stage_outputs(&self, job_id: &JobId, stage_name: &str, order: u8) -> Result<Vec<Artifact>, OrchestratorError> {
        let stage_dir_name = format!("{order:02}_{stage_name}");
        let dir = self.job_dir(job_id).join(&stage_dir_name);
        let mut artifacts = Vec::new();
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(artifacts);
        }
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let bytes = tokio::fs::read(entry.path()).await?;
            let relative_path = format!("{stage_dir_name}/{}", entry.file_name().to_string_lossy());
            artifacts.push(Artifact::new(relative_path, ContentHash::digest(&bytes), bytes.len() as u64));
        }
        artifacts.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(artifacts)
    }
}
