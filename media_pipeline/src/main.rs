// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Media Pipeline CLI
//!
//! The composition root: wires the bootstrap layer's validated CLI into
//! the application layer's two use cases, builds every infrastructure
//! adapter, and maps the outcome to the process's exit code.
//!
//! ## Directories
//!
//! Three root directories, each overridable by an environment variable:
//!
//! - `MEDIA_PIPELINE_OUT_DIR` (default `out`) - job directories and manifests.
//! - `MEDIA_PIPELINE_CACHE_DIR` (default `cache`) - baseline/translation-memory/YouTube caches.
//! - `MEDIA_PIPELINE_PROFILES_DIR` (default `profiles`) - per-user profile + ledger JSON.
//! - `MEDIA_PIPELINE_CONFIG_DIR` (default `config`) - system-wide `.env.pipeline` override.
//!
//! ## Stage interpreters
//!
//! Each stage runs in one of a handful of named environments (`common`,
//! `demucs`, `pyannote`, `whisperx`, `llm`, `nllb`). The interpreter path for
//! environment `X` is read from `MEDIA_PIPELINE_INTERPRETER_X` (uppercased),
//! falling back to the conventional `/opt/envs/X/bin/python`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use media_pipeline::application::commands::RunPipelineCommand;
use media_pipeline::application::ports::{JobDirectoryPort, MediaIngestPort};
use media_pipeline::application::services::cancellation::CancellationToken;
use media_pipeline::application::services::orchestrator::Orchestrator;
use media_pipeline::application::use_cases::{PrepareJobUseCase, RunPipelineUseCase};
use media_pipeline::application::PrepareJobCommand;
use media_pipeline::infrastructure::logging::init_global_subscriber;
use media_pipeline::infrastructure::repositories::{
    FsBaselineCacheRepository, FsTranslationMemoryRepository, FsYoutubeCacheRepository, JsonCostLedger,
    JsonManifestRepository, JsonUserProfileRepository,
};
use media_pipeline::infrastructure::runtime::{StaticInterpreterResolver, SubprocessStageExecutor};
use media_pipeline::infrastructure::{FsJobDirectoryPort, MetricsEndpoint, MetricsService, YtDlpMediaIngestPort};
use media_pipeline_bootstrap::{bootstrap_cli, create_signal_handler, prepare_job_exit_code, run_pipeline_exit_code, ExitCode, ValidatedCommand};
use media_pipeline_domain::repositories::StageExecutor;
use media_pipeline_domain::{JobId, OrchestratorError, WorkflowVariant};

/// The named stage execution environments the stage registry assigns
/// stages to; see `media_pipeline_domain::services::stage_registry`.
const STAGE_ENVIRONMENTS: &[&str] = &["common", "demucs", "pyannote", "whisperx", "llm", "nllb"];

const DEFAULT_METRICS_PORT: u16 = 9898;

#[tokio::main]
async fn main() {
    let validated = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(error) => {
            eprintln!("argument error: {error}");
            std::process::exit(ExitCode::UsageError.as_i32());
        }
    };

    init_global_subscriber(validated.verbose);

    let dirs = Directories::from_env();
    let metrics = match MetricsService::new() {
        Ok(service) => Arc::new(service),
        Err(error) => {
            eprintln!("failed to initialize metrics: {error}");
            std::process::exit(ExitCode::Software.as_i32());
        }
    };
    spawn_metrics_endpoint(metrics.clone());

    let exit_code = match validated.command {
        ValidatedCommand::PrepareJob { .. } => {
            let use_case = build_prepare_job_use_case(&dirs);
            let command = match to_prepare_job_command(validated.command) {
                Ok(command) => command,
                Err(error) => {
                    eprintln!("{error}");
                    std::process::exit(ExitCode::UsageError.as_i32());
                }
            };
            let result = use_case.execute(command).await;
            report_prepare_job(&result);
            prepare_job_exit_code(&result.map(|_| ()))
        }
        ValidatedCommand::RunPipeline { .. } => {
            let cancellation = CancellationToken::new();
            spawn_signal_handler(cancellation.clone());

            let orchestrator = Arc::new(build_orchestrator(&dirs, metrics.clone(), cancellation));
            let use_case = RunPipelineUseCase::new(orchestrator);
            let command = match to_run_pipeline_command(validated.command) {
                Ok(command) => command,
                Err(error) => {
                    eprintln!("{error}");
                    std::process::exit(ExitCode::UsageError.as_i32());
                }
            };
            let result = use_case.execute(command).await;
            report_run_pipeline(&result);
            run_pipeline_exit_code(&result.map(|_| ()))
        }
    };

    std::process::exit(exit_code);
}

struct Directories {
    out_dir: PathBuf,
    cache_dir: PathBuf,
    profiles_dir: PathBuf,
    config_dir: PathBuf,
}

impl Directories {
    fn from_env() -> Self {
        Self {
            out_dir: env_path("MEDIA_PIPELINE_OUT_DIR", "out"),
            cache_dir: env_path("MEDIA_PIPELINE_CACHE_DIR", "cache"),
            profiles_dir: env_path("MEDIA_PIPELINE_PROFILES_DIR", "profiles"),
            config_dir: env_path("MEDIA_PIPELINE_CONFIG_DIR", "config"),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

fn interpreter_resolver() -> StaticInterpreterResolver {
    let mut paths = HashMap::new();
    for env_name in STAGE_ENVIRONMENTS {
        let var = format!("MEDIA_PIPELINE_INTERPRETER_{}", env_name.to_uppercase());
        let path = std::env::var(&var).unwrap_or_else(|_| format!("/opt/envs/{env_name}/bin/python"));
        paths.insert(env_name.to_string(), path);
    }
    StaticInterpreterResolver::new(paths)
}

fn build_prepare_job_use_case(dirs: &Directories) -> PrepareJobUseCase {
    let job_directory: Arc<dyn JobDirectoryPort> = Arc::new(FsJobDirectoryPort::new(dirs.out_dir.clone()));
    let youtube_cache = Arc::new(FsYoutubeCacheRepository::new(dirs.cache_dir.clone()));
    let media_ingest: Arc<dyn MediaIngestPort> =
        Arc::new(YtDlpMediaIngestPort::new(dirs.cache_dir.join("online"), youtube_cache));
    let manifest_repository = Arc::new(JsonManifestRepository::new(dirs.out_dir.clone()));
    let user_profile_repository = Arc::new(JsonUserProfileRepository::new(dirs.profiles_dir.clone()));
    let cost_ledger = Arc::new(JsonCostLedger::new(dirs.profiles_dir.clone()));

    PrepareJobUseCase::new(
        job_directory,
        media_ingest,
        manifest_repository,
        user_profile_repository,
        cost_ledger,
        dirs.config_dir.join(".env.pipeline"),
    )
}

fn build_orchestrator(dirs: &Directories, metrics: Arc<MetricsService>, cancellation: CancellationToken) -> Orchestrator {
    let job_directory: Arc<dyn JobDirectoryPort> = Arc::new(FsJobDirectoryPort::new(dirs.out_dir.clone()));
    let manifest_repository = Arc::new(JsonManifestRepository::new(dirs.out_dir.clone()));
    let user_profile_repository = Arc::new(JsonUserProfileRepository::new(dirs.profiles_dir.clone()));
    let cost_ledger = Arc::new(JsonCostLedger::new(dirs.profiles_dir.clone()));
    let stage_executor: Arc<dyn StageExecutor> = Arc::new(SubprocessStageExecutor::new(Arc::new(interpreter_resolver())));
    let baseline_cache = Arc::new(FsBaselineCacheRepository::new(dirs.cache_dir.clone()));
    let translation_memory = Arc::new(FsTranslationMemoryRepository::new(dirs.cache_dir.join("translation_memory.jsonl")));

    Orchestrator::new(
        manifest_repository,
        job_directory,
        stage_executor,
        user_profile_repository,
        cost_ledger,
        baseline_cache,
        translation_memory,
        Some(metrics),
        cancellation,
    )
}

fn spawn_metrics_endpoint(metrics: Arc<MetricsService>) {
    let port = std::env::var("MEDIA_PIPELINE_METRICS_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_METRICS_PORT);
    tokio::spawn(async move {
        let endpoint = MetricsEndpoint::new(metrics, port);
        if let Err(error) = endpoint.start().await {
            tracing::warn!(%error, "metrics endpoint exited");
        }
    });
}

fn spawn_signal_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        let handler = create_signal_handler();
        let callback: media_pipeline_bootstrap::ShutdownCallback = Box::new(move || cancellation.cancel());
        handler.wait_for_signal(callback).await;
    });
}

fn to_prepare_job_command(command: ValidatedCommand) -> Result<PrepareJobCommand, OrchestratorError> {
    match command {
        ValidatedCommand::PrepareJob {
            media,
            workflow,
            source_language,
            target_languages,
            start_time,
            end_time,
            estimate_only,
            no_source_separation,
            user,
            tmdb_title,
            tmdb_year,
        } => {
            let workflow: WorkflowVariant = workflow.parse()?;
            let mut builder = PrepareJobCommand::builder(media, workflow, user);
            if let Some(lang) = source_language {
                builder = builder.source_language(lang);
            }
            for lang in target_languages {
                builder = builder.target_language(lang);
            }
            if let (Some(start), Some(end)) = (start_time, end_time) {
                builder = builder.clip_window(start, end);
            }
            builder = builder.estimate_only(estimate_only).no_source_separation(no_source_separation);
            if let (Some(title), Some(year)) = (tmdb_title, tmdb_year) {
                builder = builder.tmdb(title, year);
            }
            Ok(builder.build())
        }
        ValidatedCommand::RunPipeline { .. } => unreachable!("dispatched only for PrepareJob"),
    }
}

fn to_run_pipeline_command(command: ValidatedCommand) -> Result<RunPipelineCommand, OrchestratorError> {
    match command {
        ValidatedCommand::RunPipeline {
            job,
            resume,
            stages,
            continue_on_error,
            allow_budget_override,
        } => {
            let job_id: JobId = job.parse()?;
            let mut cmd = RunPipelineCommand::new(job_id);
            if !resume {
                cmd = cmd.no_resume();
            }
            if !stages.is_empty() {
                cmd = cmd.only_stages(stages.into_iter().collect());
            }
            cmd = cmd.continue_on_error(continue_on_error);
            cmd = cmd.allow_budget_override(allow_budget_override);
            Ok(cmd)
        }
        ValidatedCommand::PrepareJob { .. } => unreachable!("dispatched only for RunPipeline"),
    }
}

fn report_prepare_job(result: &Result<media_pipeline::application::commands::PrepareJobResult, OrchestratorError>) {
    match result {
        Ok(outcome) => match (&outcome.job_id, &outcome.job_dir) {
            (Some(job_id), Some(job_dir)) => {
                println!("job {job_id} prepared at {job_dir}");
                if let Some(cost) = &outcome.estimated_cost {
                    println!("estimated cost: {cost}");
                }
            }
            _ => {
                if let Some(cost) = &outcome.estimated_cost {
                    println!("estimated cost: {cost}");
                }
            }
        },
        Err(error) => eprintln!("prepare-job failed: {error}"),
    }
}

fn report_run_pipeline(result: &Result<media_pipeline::application::commands::RunPipelineResult, OrchestratorError>) {
    match result {
        Ok(outcome) => {
            println!(
                "job {} completed: {} stage(s) executed, {} skipped, total cost {}",
                outcome.job_id,
                outcome.executed_stages.len(),
                outcome.skipped_stages.len(),
                outcome.total_cost
            );
        }
        Err(error) => eprintln!("run-pipeline failed: {error}"),
    }
}
