// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application-layer ports: seams the use cases depend on that aren't
//! general-purpose domain repositories, but are still swappable
//! infrastructure (job directory materialization, media download).

use async_trait::async_trait;
use media_pipeline_domain::{Artifact, Job, JobId, MediaFingerprint, OrchestratorError, StageParameters, UserId};

/// Allocates job ids and materializes the on-disk job directory
/// structure, the job-manager responsibilities that are pure filesystem
/// layout rather than domain logic: `out/YYYY/MM/DD/<user>/<seq>/`,
/// `job.json`, the merged `.env`, `logs/`, and the initial manifest.
#[async_trait]
pub trait JobDirectoryPort: Send + Sync {
    /// Allocates a collision-free, monotonically increasing sequence
    /// number for `(date, user)`, guarded by an OS advisory lock over the
    /// sequence counter file.
    async fn allocate_job_id(&self, date: &str, user: &UserId) -> Result<JobId, OrchestratorError>;

    /// Materializes the job directory for a freshly allocated job,
    /// writing `job.json`, the merged per-job `.env`, and an empty
    /// `logs/` directory. All-or-nothing: on any failure, no partial
    /// directory is left behind.
    async fn materialize(&self, job: &Job, env_contents: &str) -> Result<String, OrchestratorError>;

    /// Absolute path to a job's root directory, whether or not it has
    /// been materialized yet.
    fn job_root(&self, job_id: &JobId) -> String;

    /// Loads the resolved parameter snapshot for one stage, written at
    /// `prepare-job` time by merging the four config layers
    /// (`domain::services::config_resolver`).
    async fn load_stage_parameters(&self, job_id: &JobId, stage_name: &str) -> Result<StageParameters, OrchestratorError>;

    /// Path to the resolved `CONFIG_SNAPSHOT` file passed to a stage's
    /// subprocess environment.
    fn config_snapshot_path(&self, job_id: &JobId, stage_name: &str) -> String;

    /// Path to a stage's own output subdirectory, `NN_<stage>/`.
    fn stage_output_dir(&self, job_id: &JobId, stage_name: &str, order: u8) -> String;

    /// Writes a stage's resolved parameter snapshot, read back by
    /// [`JobDirectoryPort::load_stage_parameters`] at run time.
    async fn write_stage_parameters(
        &self,
        job_id: &JobId,
        stage_name: &str,
        parameters: &StageParameters,
    ) -> Result<(), OrchestratorError>;

    /// Creates (idempotently) a stage's output directory and returns its
    /// absolute path, ready for the subprocess to write into.
    async fn prepare_stage_output_dir(&self, job_id: &JobId, stage_name: &str, order: u8) -> Result<String, OrchestratorError>;

    /// Walks a stage's output directory and hashes every file found there,
    /// producing the artifact list recorded against its stage record.
    async fn collect_stage_outputs(&self, job_id: &JobId, stage_name: &str, order: u8) -> Result<Vec<Artifact>, OrchestratorError>;

    /// Reads back a file written under the job directory, used to hash
    /// declared outputs at finalization.
    async fn read_job_file(&self, job_id: &JobId, relative_path: &str) -> Result<Vec<u8>, OrchestratorError>;

    /// Checks whether a file exists under the job directory, used for
    /// pre-flight input checks.
    async fn job_file_exists(&self, job_id: &JobId, relative_path: &str) -> Result<bool, OrchestratorError>;

    /// Writes arbitrary bytes under the job directory, creating parent
    /// directories as needed. Used to materialize baseline-cache-restored
    /// artifacts into a job's stage output directories.
    async fn write_job_file(&self, job_id: &JobId, relative_path: &str, bytes: &[u8]) -> Result<(), OrchestratorError>;
}

/// Resolves a `--media` value (local path or URL) into a usable local
/// file, downloading and caching YouTube/Vimeo URLs as needed.
#[async_trait]
pub trait MediaIngestPort: Send + Sync {
    /// Returns the local path the `demux` stage should read from, and the
    /// duration of the media in milliseconds (used for cost estimation
    /// and stage timeouts).
    async fn ingest(&self, media: &str) -> Result<IngestedMedia, OrchestratorError>;
}

#[derive(Debug, Clone)]
pub struct IngestedMedia {
    pub local_path: String,
    pub duration_millis: u64,
    pub from_cache: bool,
    /// Content fingerprint sampled from the ingested file, when it could
    /// be read locally; `None` if sampling failed (never a hard error).
    pub media_fingerprint: Option<MediaFingerprint>,
}
