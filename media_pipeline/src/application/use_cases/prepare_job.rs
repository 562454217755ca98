// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `PrepareJobUseCase`: allocates a job id, materializes the job
//! directory, and writes the initial manifest - all or nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use media_pipeline_domain::repositories::{CostLedgerRepository, ManifestRepository, UserProfileRepository};
use media_pipeline_domain::services::config_resolver::{self, ConfigLayer};
use media_pipeline_domain::services::{cost_estimator, stage_registry, JobStageContext};
use media_pipeline_domain::{ClipWindow, CostAmount, Job, JobAggregate, LanguageCode, MediaSource, OrchestratorError, UserId, WorkflowVariant};

use crate::application::commands::{PrepareJobCommand, PrepareJobResult};
use crate::application::ports::{JobDirectoryPort, MediaIngestPort};
use crate::infrastructure::config::{self, compiled_defaults, KNOWN_CONFIG_KEYS};

/// Default monthly budget ceiling assigned the first time a user is
/// referenced, absent any prior profile.
const DEFAULT_BUDGET_CEILING_USD: f64 = 20.0;

pub struct PrepareJobUseCase {
    job_directory: Arc<dyn JobDirectoryPort>,
    media_ingest: Arc<dyn MediaIngestPort>,
    manifest_repository: Arc<dyn ManifestRepository>,
    user_profile_repository: Arc<dyn UserProfileRepository>,
    cost_ledger: Arc<dyn CostLedgerRepository>,
    /// Path to the system-wide `config/.env.pipeline` override layer.
    system_env_path: PathBuf,
}

impl PrepareJobUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_directory: Arc<dyn JobDirectoryPort>,
        media_ingest: Arc<dyn MediaIngestPort>,
        manifest_repository: Arc<dyn ManifestRepository>,
        user_profile_repository: Arc<dyn UserProfileRepository>,
        cost_ledger: Arc<dyn CostLedgerRepository>,
        system_env_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_directory,
            media_ingest,
            manifest_repository,
            user_profile_repository,
            cost_ledger,
            system_env_path: system_env_path.into(),
        }
    }

    pub async fn execute(&self, cmd: PrepareJobCommand) -> Result<PrepareJobResult, OrchestratorError> {
        let user_id = UserId::new(cmd.user.clone())?;

        let profile = self
            .user_profile_repository
            .load_or_bootstrap(&user_id, CostAmount::from_usd(DEFAULT_BUDGET_CEILING_USD)?)
            .await?;
        let ledger = self.cost_ledger.load(&user_id).await?;
        // Refuse at prepare time only if the user is already over budget
        // from prior jobs; the forecast for *this* job never blocks
        // prepare-job on its own, since no paid stage has run yet.
        if ledger.cumulative_usage.utilization_of(ledger.budget_ceiling) > 1.0 {
            return Err(OrchestratorError::BudgetExceeded(format!(
                "user '{user_id}' is already over their monthly budget ceiling"
            )));
        }

        let ingested = self.media_ingest.ingest(&cmd.media).await?;

        let source_language = match &cmd.source_language {
            Some(raw) => LanguageCode::parse(raw)?,
            None => LanguageCode::Auto,
        };
        let target_languages: BTreeSet<String> = cmd
            .target_languages
            .iter()
            .map(|raw| LanguageCode::parse(raw).map(|l| l.to_string()))
            .collect::<Result<_, _>>()?;

        let clip_window = match (&cmd.start_time, &cmd.end_time) {
            (Some(start), Some(end)) => Some(ClipWindow::from_timecodes(start, end)?),
            (None, None) => None,
            _ => {
                return Err(OrchestratorError::ValidationError(
                    "--start-time and --end-time must be given together".to_string(),
                ))
            }
        };

        let mut enabled_optional_stages: BTreeSet<String> = BTreeSet::new();
        if !cmd.no_source_separation {
            enabled_optional_stages.insert("source_separation".to_string());
        }
        if cmd.tmdb_title.is_some() {
            enabled_optional_stages.insert("tmdb".to_string());
            enabled_optional_stages.insert("glossary".to_string());
        }

        let stage_ctx = JobStageContext {
            source_separation_requested: !cmd.no_source_separation,
            tmdb_title_present: cmd.tmdb_title.is_some(),
            ner_enabled: false,
            source_language_equals_target: false,
        };
        let stage_names: Vec<_> = stage_registry::stages_for(cmd.workflow, &stage_ctx)
            .into_iter()
            .map(|(name, _, _)| name)
            .collect();
        let estimated_chars = (ingested.duration_millis / 1000) * 15; // rough speech-rate heuristic
        let estimated_cost = cost_estimator::forecast_plan(&stage_names, ingested.duration_millis, estimated_chars);

        if cmd.estimate_only {
            tracing::info!(estimated_cost = %estimated_cost, "estimate-only: no job materialized");
            return Ok(PrepareJobResult {
                job_id: None,
                job_dir: None,
                estimated_cost: Some(estimated_cost),
            });
        }

        let now = Utc::now();
        let job_id = self
            .job_directory
            .allocate_job_id(&now.format("%Y%m%d").to_string(), &user_id)
            .await?;

        let media_source = if cmd.media.starts_with("http://") || cmd.media.starts_with("https://") {
            MediaSource::Url(cmd.media.clone())
        } else {
            MediaSource::LocalPath(ingested.local_path.clone())
        };

        let job = Job::new(
            job_id.clone(),
            user_id,
            media_source,
            cmd.workflow,
            source_language,
            target_languages.clone(),
            clip_window,
            enabled_optional_stages.clone(),
            None,
            ingested.media_fingerprint,
            now,
        );

        let env_contents = render_job_env(&job, &ingested);
        let job_dir = self.job_directory.materialize(&job, &env_contents).await?;

        let mut job_layer_values = BTreeMap::new();
        job_layer_values.insert("workflow".to_string(), serde_json::json!(job.workflow().to_string()));
        job_layer_values.insert("source_language".to_string(), serde_json::json!(job.source_language().to_string()));
        job_layer_values.insert("target_languages".to_string(), serde_json::json!(target_languages.iter().collect::<Vec<_>>()));
        job_layer_values.insert("source_separation.enabled".to_string(), serde_json::json!(!cmd.no_source_separation));
        if let Some(title) = &cmd.tmdb_title {
            job_layer_values.insert("tmdb.title".to_string(), serde_json::json!(title));
        }
        if let Some(year) = cmd.tmdb_year {
            job_layer_values.insert("tmdb.year".to_string(), serde_json::json!(year));
        }
        let job_env_layer = config::load_job_env_layer(&std::path::Path::new(&job_dir).join(format!(".job-{}.env", job_id)))?;
        let system_env_layer = config::load_system_env_layer(&self.system_env_path)?;
        let layers = vec![
            ConfigLayer {
                source: "job_json",
                values: job_layer_values,
            },
            job_env_layer,
            system_env_layer,
            compiled_defaults(),
        ];
        let resolved = config_resolver::resolve_layers(&layers, KNOWN_CONFIG_KEYS);
        for stage_name in &stage_names {
            let view = config_resolver::stage_view(&resolved, stage_name.as_str());
            self.job_directory.write_stage_parameters(&job_id, stage_name.as_str(), &view).await?;
        }

        let aggregate = JobAggregate::new(job);
        self.manifest_repository.save(&aggregate).await?;

        tracing::info!(job_id = %job_id, estimated_cost = %estimated_cost, "job prepared");

        Ok(PrepareJobResult {
            job_id: Some(job_id),
            job_dir: Some(job_dir),
            estimated_cost: Some(estimated_cost),
        })
    }
}

fn render_job_env(job: &Job, ingested: &crate::application::ports::IngestedMedia) -> String {
    format!(
        "WORKFLOW={}\nSOURCE_LANGUAGE={}\nMEDIA_DURATION_MS={}\nFROM_CACHE={}\n",
        job.workflow(),
        job.source_language(),
        ingested.duration_millis,
        ingested.from_cache,
    )
}
