// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `Orchestrator`: drives one job's plan to completion.
//!
//! Five steps, in order: load the manifest and check the job's lifecycle
//! allows a run; compute the plan; filter out stages the resume policy
//! says are already satisfied; execute the remaining stages one at a
//! time with pre-flight checks, budget gating, retry-once-with-extended-
//! timeout, and cancellation; finalize the job as completed or failed.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use media_pipeline_domain::repositories::{
    BaselineCacheEntry, BaselineCacheRepository, CostLedgerRepository, ManifestRepository, StageExecutionRequest,
    StageExecutor, TranslationMemoryRepository, UserProfileRepository,
};
use media_pipeline_domain::services::{cost_estimator, retry_policy, stage_registry, workflow_planner, JobStageContext};
use media_pipeline_domain::value_objects::{ContentHash, MediaFingerprint, StageName, StageOrder};
use media_pipeline_domain::{Artifact, CostAmount, JobAggregate, JobId, OrchestratorError, StageRecord};

use crate::application::commands::{RunPipelineCommand, RunPipelineResult};
use crate::application::ports::JobDirectoryPort;
use crate::application::services::cancellation::CancellationToken;
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::runtime::{resolve_requirements, JobResourceGuard};

/// Credential keys the orchestrator knows how to look up on a user's
/// profile and forward to a stage subprocess as environment variables.
/// Stages that need a credential not in this list are out of scope for
/// this implementation.
const CREDENTIAL_KEYS: &[&str] = &["HF_TOKEN", "OPENAI_API_KEY", "TMDB_API_KEY"];

/// Fallback media duration used for cost estimation and stage timeouts
/// when a job has no clip window - the orchestrator does not itself
/// track the full source media's duration, only the window it was asked
/// to clip to.
const DEFAULT_DURATION_HINT_MILLIS: u64 = 10 * 60 * 1000;

const MIN_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

fn timeout_multiplier(stage_name: &str) -> f64 {
    match stage_name {
        "asr" => 1.5,
        "source_separation" => 3.0,
        _ => 2.0,
    }
}

pub struct Orchestrator {
    manifest_repository: Arc<dyn ManifestRepository>,
    job_directory: Arc<dyn JobDirectoryPort>,
    stage_executor: Arc<dyn StageExecutor>,
    user_profile_repository: Arc<dyn UserProfileRepository>,
    cost_ledger: Arc<dyn CostLedgerRepository>,
    baseline_cache: Arc<dyn BaselineCacheRepository>,
    translation_memory: Arc<dyn TranslationMemoryRepository>,
    metrics: Option<Arc<MetricsService>>,
    cancellation: CancellationToken,
}

/// Baseline-cacheable stages: demux through alignment, the expensive,
/// deterministic-given-media-and-model prefix of every workflow.
const BASELINE_CACHEABLE_STAGES: &[&str] = &["demux", "pyannote_vad", "asr", "alignment"];

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        manifest_repository: Arc<dyn ManifestRepository>,
        job_directory: Arc<dyn JobDirectoryPort>,
        stage_executor: Arc<dyn StageExecutor>,
        user_profile_repository: Arc<dyn UserProfileRepository>,
        cost_ledger: Arc<dyn CostLedgerRepository>,
        baseline_cache: Arc<dyn BaselineCacheRepository>,
        translation_memory: Arc<dyn TranslationMemoryRepository>,
        metrics: Option<Arc<MetricsService>>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            manifest_repository,
            job_directory,
            stage_executor,
            user_profile_repository,
            cost_ledger,
            baseline_cache,
            translation_memory,
            metrics,
            cancellation,
        }
    }

    pub async fn run(&self, cmd: RunPipelineCommand) -> Result<RunPipelineResult, OrchestratorError> {
        let mut aggregate = self
            .manifest_repository
            .load(&cmd.job_id)
            .await?
            .ok_or_else(|| OrchestratorError::ValidationError(format!("no manifest found for job '{}'", cmd.job_id)))?;

        if aggregate.job().status().is_terminal_success() && cmd.stages.is_none() {
            return Ok(RunPipelineResult {
                job_id: cmd.job_id,
                completed: true,
                executed_stages: Vec::new(),
                skipped_stages: Vec::new(),
                total_cost: CostAmount::ZERO,
            });
        }
        if !aggregate.job().status().allows_resume() {
            return Err(OrchestratorError::ValidationError(format!(
                "job '{}' is in a state that cannot be run",
                cmd.job_id
            )));
        }

        let job_root = self.job_directory.job_root(&cmd.job_id);
        let _guard = JobResourceGuard::acquire(Path::new(&job_root))?;

        let job = aggregate.job().clone();
        let profile = self
            .user_profile_repository
            .load(job.user_id())
            .await?
            .ok_or_else(|| OrchestratorError::InternalError(format!("no profile for user '{}'", job.user_id())))?;

        let stage_ctx = JobStageContext {
            source_separation_requested: job.enabled_optional_stages().contains("source_separation"),
            tmdb_title_present: job.enabled_optional_stages().contains("tmdb"),
            ner_enabled: job.enabled_optional_stages().contains("ner"),
            source_language_equals_target: false,
        };

        let mut resolved_parameters = BTreeMap::new();
        for stage_name in stage_registry::all_stage_names() {
            let params = self.job_directory.load_stage_parameters(&cmd.job_id, stage_name).await?;
            resolved_parameters.insert(stage_name.to_string(), params);
        }
        let required_asr_model_tag = resolved_parameters
            .get("asr")
            .and_then(|p| p.get("asr.model"))
            .and_then(|v| v.as_str())
            .unwrap_or("base")
            .to_string();

        let required_credentials_available =
            !stage_ctx.tmdb_title_present || profile.credential("TMDB_API_KEY").is_some();

        let planning_input = workflow_planner::PlanningInput {
            workflow: job.workflow(),
            source_language: job.source_language().clone(),
            target_languages: job.target_languages().clone(),
            source_media_available: true,
            required_credentials_available,
            stage_ctx,
            resolved_parameters,
        };
        let plan = workflow_planner::plan(&planning_input)?;
        let planned_names: std::collections::BTreeSet<String> =
            plan.iter().map(|p| p.stage_name.to_string()).collect();

        if cmd.resume {
            if let Some(fingerprint) = job.media_fingerprint() {
                if let Some(entry) = self.baseline_cache.lookup(&fingerprint, &required_asr_model_tag).await? {
                    self.apply_baseline_cache_hit(&mut aggregate, &cmd, &planned_names, &fingerprint, &entry).await?;
                }
            }
        }

        let duration_millis = job
            .clip_window()
            .map(|w| w.duration_millis())
            .unwrap_or(DEFAULT_DURATION_HINT_MILLIS);
        let estimated_chars = (duration_millis / 1000) * 15;

        let credential_env_vars: BTreeMap<String, String> = CREDENTIAL_KEYS
            .iter()
            .filter_map(|key| profile.credential(key).map(|token| (key.to_string(), token.to_string())))
            .collect();

        let mut executed_stages = Vec::new();
        let mut skipped_stages = Vec::new();
        let mut total_cost = CostAmount::ZERO;

        for planned in &plan {
            if self.cancellation.is_cancelled() {
                aggregate.fail_job("run cancelled by operator", Utc::now())?;
                self.persist(&mut aggregate).await?;
                return Err(OrchestratorError::Cancelled(format!(
                    "run-pipeline for '{}' was cancelled",
                    cmd.job_id
                )));
            }

            if let Some(only) = &cmd.stages {
                if !only.contains(planned.stage_name.as_str()) {
                    continue;
                }
            }

            if cmd.resume {
                if let Some(record) = aggregate.current_record(&planned.stage_name) {
                    if record.is_completed()
                        && record.parameters == planned.parameters
                        && self.inputs_unchanged(&cmd.job_id, record).await?
                    {
                        skipped_stages.push(planned.stage_name.to_string());
                        continue;
                    }
                }
            }

            let descriptor = stage_registry::descriptor(planned.stage_name.as_str())
                .ok_or_else(|| OrchestratorError::InternalError(format!("unknown stage '{}'", planned.stage_name)))?;
            let stage_order = StageOrder::new(descriptor.order)?;
            let inputs = declared_inputs(&aggregate, planned.stage_name.as_str())?;

            if let Some(missing_dep) = self.first_missing_dependency(&cmd, &planned_names, planned.stage_name.as_str()).await? {
                let message = format!("dependency '{missing_dep}' has not produced output yet");
                aggregate.start_stage(planned.stage_name.clone(), stage_order, planned.env_name.clone(), planned.parameters.clone(), inputs.clone(), Utc::now())?;
                aggregate.fail_stage(planned.stage_name.clone(), "MissingInput", message.clone(), None, Utc::now())?;
                aggregate.fail_job(message.clone(), Utc::now())?;
                self.persist(&mut aggregate).await?;
                if let Some(metrics) = &self.metrics {
                    metrics.record_stage_outcome(planned.stage_name.as_str(), "missing_input");
                }
                return Err(OrchestratorError::MissingInput(message));
            }

            let cost_item = cost_estimator::estimate_stage(&planned.stage_name, duration_millis, estimated_chars);
            let projected = cost_item.amount();
            if projected > CostAmount::ZERO {
                let ledger = self.cost_ledger.load(job.user_id()).await?;
                if (ledger.cumulative_usage + projected).utilization_of(ledger.budget_ceiling) > 1.0 && !cmd.allow_budget_override {
                    let message = format!(
                        "stage '{}' projected cost {projected} would exceed the monthly budget",
                        planned.stage_name
                    );
                    aggregate.start_stage(planned.stage_name.clone(), stage_order, planned.env_name.clone(), planned.parameters.clone(), inputs.clone(), Utc::now())?;
                    aggregate.fail_stage(planned.stage_name.clone(), "BudgetExceeded", message.clone(), None, Utc::now())?;
                    aggregate.fail_job(message.clone(), Utc::now())?;
                    self.persist(&mut aggregate).await?;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_stage_outcome(planned.stage_name.as_str(), "budget_exceeded");
                    }
                    return Err(OrchestratorError::BudgetExceeded(message));
                }
            }

            aggregate.start_stage(planned.stage_name.clone(), stage_order, planned.env_name.clone(), planned.parameters.clone(), inputs, Utc::now())?;
            self.persist(&mut aggregate).await?;

            let stage_output_dir = self
                .job_directory
                .prepare_stage_output_dir(&cmd.job_id, planned.stage_name.as_str(), descriptor.order)
                .await?;
            let config_snapshot_path = self.job_directory.config_snapshot_path(&cmd.job_id, planned.stage_name.as_str());
            let resources = resolve_requirements(memory_hint_mb(&planned.parameters));
            let base_timeout = stage_timeout(duration_millis, planned.stage_name.as_str());

            let mut extra_env_vars: BTreeMap<String, String> = BTreeMap::new();
            if planned.stage_name.as_str() == "translation" {
                if let Some(location) = self.translation_memory.store_location() {
                    extra_env_vars.insert("TRANSLATION_MEMORY_PATH".to_string(), location.to_string());
                }
            }

            let mut attempt = 1u32;
            let outcome = loop {
                let timeout = if attempt == 1 {
                    base_timeout
                } else {
                    retry_policy::extended_timeout(base_timeout)
                };
                let request = StageExecutionRequest {
                    job_dir: job_root.clone(),
                    stage_name: planned.stage_name.clone(),
                    stage_output_dir: stage_output_dir.clone(),
                    env: planned.env_name.clone(),
                    config_snapshot_path: config_snapshot_path.clone(),
                    parameters: planned.parameters.clone(),
                    credential_env_vars: credential_env_vars.clone(),
                    extra_env_vars: extra_env_vars.clone(),
                    timeout,
                    resources: resources.clone(),
                };
                let start = std::time::Instant::now();
                let result = self.stage_executor.execute(request).await;
                if let Some(metrics) = &self.metrics {
                    metrics.observe_stage_duration(start.elapsed().as_secs_f64());
                }

                match result {
                    Ok(execution) => break Ok(execution),
                    Err(error) if retry_policy::should_retry(&error, attempt) => {
                        tracing::warn!(
                            stage = planned.stage_name.as_str(),
                            attempt,
                            error = %error,
                            "stage failed, retrying with extended timeout"
                        );
                        tokio::time::sleep(retry_policy::backoff_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    Err(error) => break Err(error),
                }
            };

            match outcome {
                Ok(execution) => {
                    let outputs = self
                        .job_directory
                        .collect_stage_outputs(&cmd.job_id, planned.stage_name.as_str(), descriptor.order)
                        .await?;
                    aggregate.complete_stage(planned.stage_name.clone(), execution.exit_code, outputs, Utc::now())?;
                    self.persist(&mut aggregate).await?;

                    if projected > CostAmount::ZERO {
                        self.cost_ledger.record_usage(job.user_id(), projected).await?;
                    }
                    total_cost = total_cost + projected;
                    executed_stages.push(planned.stage_name.to_string());
                    if let Some(metrics) = &self.metrics {
                        metrics.observe_stage_cost(projected.as_usd());
                        metrics.record_stage_outcome(planned.stage_name.as_str(), "completed");
                    }
                }
                Err(error) => {
                    aggregate.fail_stage(planned.stage_name.clone(), error.category(), error.to_string(), None, Utc::now())?;
                    aggregate.fail_job(format!("stage '{}' failed: {error}", planned.stage_name), Utc::now())?;
                    self.persist(&mut aggregate).await?;
                    if let Some(metrics) = &self.metrics {
                        metrics.record_stage_outcome(planned.stage_name.as_str(), "failed");
                    }
                    if cmd.continue_on_error {
                        skipped_stages.push(planned.stage_name.to_string());
                        continue;
                    }
                    return Err(error);
                }
            }
        }

        aggregate.complete_job(Utc::now())?;
        self.persist(&mut aggregate).await?;

        Ok(RunPipelineResult {
            job_id: cmd.job_id,
            completed: true,
            executed_stages,
            skipped_stages,
            total_cost,
        })
    }

    async fn first_missing_dependency(
        &self,
        cmd: &RunPipelineCommand,
        planned_names: &std::collections::BTreeSet<String>,
        stage_name: &str,
    ) -> Result<Option<String>, OrchestratorError> {
        for dep in stage_registry::dependencies(stage_name)? {
            if !planned_names.contains(dep) {
                continue;
            }
            let dep_descriptor = stage_registry::descriptor(dep)
                .ok_or_else(|| OrchestratorError::InternalError(format!("unknown dependency '{dep}'")))?;
            let dep_relative = format!("{:02}_{}", dep_descriptor.order, dep);
            if !self.job_directory.job_file_exists(&cmd.job_id, &dep_relative).await? {
                return Ok(Some(dep.to_string()));
            }
        }
        Ok(None)
    }

    async fn persist(&self, aggregate: &mut JobAggregate) -> Result<(), OrchestratorError> {
        self.manifest_repository.save(aggregate).await?;
        aggregate.mark_events_committed();
        Ok(())
    }

    /// Re-hashes a completed stage's declared inputs against what is
    /// currently on disk. A missing file or hash mismatch means an
    /// upstream output changed without the consuming stage's own
    /// parameters changing, forcing resume to re-run the stage rather
    /// than trust the stale record.
    async fn inputs_unchanged(&self, job_id: &JobId, record: &StageRecord) -> Result<bool, OrchestratorError> {
        for artifact in &record.inputs {
            let bytes = match self.job_directory.read_job_file(job_id, &artifact.relative_path).await {
                Ok(bytes) => bytes,
                Err(_) => return Ok(false),
            };
            if ContentHash::digest(&bytes) != artifact.sha256 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Restores the demux-through-alignment prefix from the baseline
    /// cache for any planned, not-yet-completed stage `entry` covers,
    /// materializing its cached bytes into this job's own stage output
    /// directories and marking the stage completed. The next pass over
    /// `plan` then finds it already satisfied and records it as skipped.
    async fn apply_baseline_cache_hit(
        &self,
        aggregate: &mut JobAggregate,
        cmd: &RunPipelineCommand,
        planned_names: &std::collections::BTreeSet<String>,
        fingerprint: &MediaFingerprint,
        entry: &BaselineCacheEntry,
    ) -> Result<(), OrchestratorError> {
        for stage_name in BASELINE_CACHEABLE_STAGES {
            if !planned_names.contains(*stage_name) {
                continue;
            }
            if let Some(only) = &cmd.stages {
                if !only.contains(*stage_name) {
                    continue;
                }
            }
            if aggregate.current_record(&StageName::new(*stage_name)).map(|r| r.is_completed()).unwrap_or(false) {
                continue;
            }
            let descriptor = stage_registry::descriptor(stage_name)
                .ok_or_else(|| OrchestratorError::InternalError(format!("unknown stage '{stage_name}'")))?;
            let stage_dir_prefix = format!("{:02}_{}", descriptor.order, stage_name);
            let stage_artifacts: Vec<Artifact> = entry
                .artifacts
                .iter()
                .filter(|a| a.relative_path.starts_with(&stage_dir_prefix))
                .cloned()
                .collect();
            if stage_artifacts.is_empty() {
                continue;
            }

            for artifact in &stage_artifacts {
                let bytes = self.baseline_cache.read_blob(fingerprint, &artifact.relative_path).await?;
                self.job_directory.write_job_file(&cmd.job_id, &artifact.relative_path, &bytes).await?;
            }

            let stage_order = StageOrder::new(descriptor.order)?;
            let env_name = media_pipeline_domain::EnvName::new(descriptor.env);
            let inputs = declared_inputs(aggregate, stage_name)?;
            let parameters = self.job_directory.load_stage_parameters(&cmd.job_id, stage_name).await?;
            let now = Utc::now();
            aggregate.start_stage(StageName::new(*stage_name), stage_order, env_name, parameters, inputs, now)?;
            aggregate.complete_stage(StageName::new(*stage_name), 0, stage_artifacts, now)?;
            self.persist(aggregate).await?;
            tracing::info!(stage = *stage_name, fingerprint = %fingerprint, "baseline cache hit");
        }
        Ok(())
    }
}

/// Gathers the current (non-superseded) output artifacts of every
/// dependency of `stage_name`, the set a resumed or freshly-started run
/// of that stage declares as its inputs.
fn declared_inputs(aggregate: &JobAggregate, stage_name: &str) -> Result<Vec<Artifact>, OrchestratorError> {
    let mut inputs = Vec::new();
    for dep in stage_registry::dependencies(stage_name)? {
        if let Some(record) = aggregate.current_record(&StageName::new(dep)) {
            inputs.extend(record.outputs.clone());
        }
    }
    Ok(inputs)
}

fn memory_hint_mb(parameters: &media_pipeline_domain::StageParameters) -> Option<u64> {
    parameters.get("resources.max_memory_hint_mb").and_then(|v| v.as_u64())
}

fn stage_timeout(duration_millis: u64, stage_name: &str) -> Duration {
    let scaled = Duration::from_millis((duration_millis as f64 * timeout_multiplier(stage_name)) as u64);
    scaled.max(MIN_STAGE_TIMEOUT)
}
