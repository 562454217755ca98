// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup: a stdout subscriber plus a per-job log file
//! mirror at `logs/99_pipeline_<ts>.log`.

use std::fs::OpenOptions;
use std::io;

use media_pipeline_domain::{JobId, OrchestratorError};
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Call once at process
/// startup, before any job-scoped spans are entered.
pub fn init_global_subscriber(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Opens (creating if absent) the pipeline-run log mirror for a job and
/// returns a non-blocking writer guard's underlying handle. Infrastructure
/// callers tee stage stderr into per-stage files separately; this is the
/// orchestrator's own run-level log.
pub fn open_pipeline_log(job_dir: &str, timestamp: &str) -> Result<impl io::Write, OrchestratorError> {
    let path = format!("{job_dir}/logs/99_pipeline_{timestamp}.log");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(OrchestratorError::from)
}

/// Builds the tracing span every orchestrator operation for a job should
/// run inside, carrying `job_id` as a structured field so every log line
/// for that run can be correlated.
pub fn job_span(job_id: &JobId) -> Span {
    tracing::info_span!("job", job_id = %job_id)
}

/// Builds the nested span for one stage execution within a job span.
pub fn stage_span(stage_name: &str) -> Span {
    tracing::info_span!("stage", stage = stage_name)
}
