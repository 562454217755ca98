// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end coverage of `prepare-job` followed by `run-pipeline`,
//! against the real filesystem adapters but fake media ingest and stage
//! execution, so these tests need neither `ffprobe`/`yt-dlp` nor a real
//! Python environment.

use std::sync::Arc;

use async_trait::async_trait;
use media_pipeline::application::commands::{PrepareJobCommand, RunPipelineCommand};
use media_pipeline::application::ports::{IngestedMedia, JobDirectoryPort, MediaIngestPort};
use media_pipeline::application::services::cancellation::CancellationToken;
use media_pipeline::application::services::orchestrator::Orchestrator;
use media_pipeline::application::use_cases::{PrepareJobUseCase, RunPipelineUseCase};
use media_pipeline::infrastructure::repositories::{
    FsBaselineCacheRepository, FsTranslationMemoryRepository, JsonCostLedger, JsonManifestRepository, JsonUserProfileRepository,
};
use media_pipeline::infrastructure::FsJobDirectoryPort;
use media_pipeline_domain::repositories::{StageExecutionRequest, StageExecutionResult, StageExecutor};
use media_pipeline_domain::{OrchestratorError, WorkflowVariant};

/// Pretends every `--media` value is already a local file of a fixed
/// duration, skipping the `ffprobe`/`yt-dlp` round trip entirely.
struct FakeMediaIngestPort {
    duration_millis: u64,
}

#[async_trait]
impl MediaIngestPort for FakeMediaIngestPort {
    async fn ingest(&self, media: &str) -> Result<IngestedMedia, OrchestratorError> {
        Ok(IngestedMedia {
            local_path: media.to_string(),
            duration_millis: self.duration_millis,
            from_cache: false,
            media_fingerprint: None,
        })
    }
}

/// Succeeds immediately without spawning anything; stage dependency
/// checks pass because `JobDirectoryPort::prepare_stage_output_dir`
/// already materializes each stage's output directory before it runs.
struct FakeStageExecutor;

#[async_trait]
impl StageExecutor for FakeStageExecutor {
    async fn execute(&self, _request: StageExecutionRequest) -> Result<StageExecutionResult, OrchestratorError> {
        Ok(StageExecutionResult {
            exit_code: 0,
            outputs: Vec::new(),
            timed_out: false,
            stderr_log_path: String::new(),
        })
    }

    async fn cancel(&self, _stage_name: &media_pipeline_domain::value_objects::StageName) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

struct Harness {
    _out_dir: tempfile::TempDir,
    _profiles_dir: tempfile::TempDir,
    _config_dir: tempfile::TempDir,
    _cache_dir: tempfile::TempDir,
    job_directory: Arc<dyn JobDirectoryPort>,
    manifest_repository: Arc<JsonManifestRepository>,
    user_profile_repository: Arc<JsonUserProfileRepository>,
    cost_ledger: Arc<JsonCostLedger>,
    cache_dir: std::path::PathBuf,
    system_env_path: std::path::PathBuf,
}

impl Harness {
    fn new() -> Self {
        let out_dir = tempfile::tempdir().expect("tempdir");
        let profiles_dir = tempfile::tempdir().expect("tempdir");
        let config_dir = tempfile::tempdir().expect("tempdir");
        let cache_dir = tempfile::tempdir().expect("tempdir");
        let job_directory: Arc<dyn JobDirectoryPort> = Arc::new(FsJobDirectoryPort::new(out_dir.path()));
        let manifest_repository = Arc::new(JsonManifestRepository::new(out_dir.path()));
        let user_profile_repository = Arc::new(JsonUserProfileRepository::new(profiles_dir.path()));
        let cost_ledger = Arc::new(JsonCostLedger::new(profiles_dir.path()));
        let system_env_path = config_dir.path().join(".env.pipeline");
        let cache_dir_path = cache_dir.path().to_path_buf();
        Self {
            _out_dir: out_dir,
            _profiles_dir: profiles_dir,
            _config_dir: config_dir,
            _cache_dir: cache_dir,
            job_directory,
            manifest_repository,
            user_profile_repository,
            cost_ledger,
            cache_dir: cache_dir_path,
            system_env_path,
        }
    }

    fn prepare_job_use_case(&self) -> PrepareJobUseCase {
        PrepareJobUseCase::new(
            self.job_directory.clone(),
            Arc::new(FakeMediaIngestPort { duration_millis: 90_000 }),
            self.manifest_repository.clone(),
            self.user_profile_repository.clone(),
            self.cost_ledger.clone(),
            self.system_env_path.clone(),
        )
    }

    fn orchestrator(&self) -> Orchestrator {
        let baseline_cache = Arc::new(FsBaselineCacheRepository::new(self.cache_dir.clone()));
        let translation_memory = Arc::new(FsTranslationMemoryRepository::new(self.cache_dir.join("translation_memory.jsonl")));
        Orchestrator::new(
            self.manifest_repository.clone(),
            self.job_directory.clone(),
            Arc::new(FakeStageExecutor),
            self.user_profile_repository.clone(),
            self.cost_ledger.clone(),
            baseline_cache,
            translation_memory,
            None,
            CancellationToken::new(),
        )
    }
}

#[tokio::test]
async fn transcribe_job_prepares_and_runs_to_completion() {
    let harness = Harness::new();
    let prepare = harness.prepare_job_use_case();

    let cmd = PrepareJobCommand::builder("clip.wav", WorkflowVariant::Transcribe, "alice")
        .source_language("en")
        .no_source_separation(true)
        .build();
    let prepared = prepare.execute(cmd).await.expect("prepare-job should succeed");

    let job_id = prepared.job_id.expect("job should be materialized");
    assert!(prepared.job_dir.is_some());
    assert!(prepared.estimated_cost.is_some());

    let run_use_case = RunPipelineUseCase::new(Arc::new(harness.orchestrator()));
    let result = run_use_case
        .execute(RunPipelineCommand::new(job_id.clone()))
        .await
        .expect("run-pipeline should succeed");

    assert!(result.completed);
    assert!(result.executed_stages.contains(&"demux".to_string()));
    assert!(result.executed_stages.contains(&"asr".to_string()));
    assert!(!result.executed_stages.contains(&"mux".to_string()));
}

#[tokio::test]
async fn estimate_only_never_materializes_a_job() {
    let harness = Harness::new();
    let prepare = harness.prepare_job_use_case();

    let cmd = PrepareJobCommand::builder("clip.wav", WorkflowVariant::Transcribe, "bob")
        .estimate_only(true)
        .build();
    let prepared = prepare.execute(cmd).await.expect("estimate-only should succeed");

    assert!(prepared.job_id.is_none());
    assert!(prepared.job_dir.is_none());
    assert!(prepared.estimated_cost.is_some());
}

#[tokio::test]
async fn rerunning_a_completed_job_without_a_stage_filter_is_a_no_op() {
    let harness = Harness::new();
    let prepare = harness.prepare_job_use_case();

    let cmd = PrepareJobCommand::builder("clip.wav", WorkflowVariant::Transcribe, "carol")
        .no_source_separation(true)
        .build();
    let prepared = prepare.execute(cmd).await.expect("prepare-job should succeed");
    let job_id = prepared.job_id.expect("job should be materialized");

    let run_use_case = RunPipelineUseCase::new(Arc::new(harness.orchestrator()));
    let first = run_use_case
        .execute(RunPipelineCommand::new(job_id.clone()))
        .await
        .expect("first run should succeed");
    assert!(!first.executed_stages.is_empty());

    let second = run_use_case
        .execute(RunPipelineCommand::new(job_id))
        .await
        .expect("second run should succeed");
    assert!(second.completed);
    assert!(second.executed_stages.is_empty());
}

#[tokio::test]
async fn prepare_job_refuses_a_user_already_over_budget() {
    use media_pipeline_domain::repositories::{CostLedgerRepository, UserProfileRepository};
    use media_pipeline_domain::{CostAmount, UserId};

    let harness = Harness::new();
    let user_id = UserId::new("dave").unwrap();
    harness
        .user_profile_repository
        .load_or_bootstrap(&user_id, CostAmount::from_usd(5.0).unwrap())
        .await
        .unwrap();
    harness
        .cost_ledger
        .record_usage(&user_id, CostAmount::from_usd(10.0).unwrap())
        .await
        .unwrap();

    let prepare = harness.prepare_job_use_case();
    let cmd = PrepareJobCommand::builder("clip.wav", WorkflowVariant::Transcribe, "dave").build();
    let error = prepare.execute(cmd).await.expect_err("over-budget user should be refused");
    assert!(matches!(error, OrchestratorError::BudgetExceeded(_)));
}

#[tokio::test]
async fn resume_skips_stages_whose_parameters_have_not_changed() {
    let harness = Harness::new();
    let prepare = harness.prepare_job_use_case();

    let cmd = PrepareJobCommand::builder("clip.wav", WorkflowVariant::Transcribe, "erin")
        .no_source_separation(true)
        .build();
    let prepared = prepare.execute(cmd).await.expect("prepare-job should succeed");
    let job_id = prepared.job_id.expect("job should be materialized");

    let run_use_case = RunPipelineUseCase::new(Arc::new(harness.orchestrator()));
    let only_demux: std::collections::BTreeSet<String> = ["demux".to_string()].into_iter().collect();
    let first = run_use_case
        .execute(RunPipelineCommand::new(job_id.clone()).only_stages(only_demux))
        .await
        .expect("partial run should succeed");
    assert_eq!(first.executed_stages, vec!["demux".to_string()]);

    // The orchestrator marks the job completed once its filtered plan
    // finishes, even though only one of its four transcribe stages ran.
    // A follow-up run naming the full stage set again (bypassing the
    // already-terminal shortcut) resumes: `demux` is skipped since its
    // parameters haven't changed, the rest execute for the first time.
    let full_plan: std::collections::BTreeSet<String> =
        ["demux", "pyannote_vad", "asr", "alignment"].iter().map(|s| s.to_string()).collect();
    let second = run_use_case
        .execute(RunPipelineCommand::new(job_id).only_stages(full_plan))
        .await
        .expect("second run should succeed");
    assert!(second.skipped_stages.contains(&"demux".to_string()));
    assert!(!second.executed_stages.contains(&"demux".to_string()));
    assert!(second.executed_stages.contains(&"asr".to_string()));
}
