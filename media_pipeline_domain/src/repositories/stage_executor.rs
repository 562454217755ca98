// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Port for executing one stage as an isolated subprocess.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::OrchestratorError;
use crate::value_objects::{Artifact, EnvName, StageName, StageParameters};

/// Advisory resource hints passed through to the stage subprocess; the
/// orchestrator does not enforce these itself, it only forwards them as
/// environment variables (e.g. a memory hint) for the stage's own
/// runtime to honor on a best-effort basis.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequirements {
    pub max_memory_hint_mb: Option<u64>,
}

/// Everything a [`StageExecutor`] needs to launch one stage.
#[derive(Debug, Clone)]
pub struct StageExecutionRequest {
    pub job_dir: String,
    pub stage_name: StageName,
    pub stage_output_dir: String,
    pub env: EnvName,
    pub config_snapshot_path: String,
    pub parameters: StageParameters,
    pub credential_env_vars: BTreeMap<String, String>,
    /// Additional environment variables beyond credentials, e.g. the
    /// translation memory store's on-disk location for the `translation`
    /// stage.
    pub extra_env_vars: BTreeMap<String, String>,
    pub timeout: Duration,
    pub resources: ResourceRequirements,
}

/// The observable result of one stage execution attempt.
#[derive(Debug, Clone)]
pub struct StageExecutionResult {
    pub exit_code: i32,
    pub outputs: Vec<Artifact>,
    pub timed_out: bool,
    pub stderr_log_path: String,
}

/// Executes a single stage in its isolated environment and reports back
/// the outcome. Implementations own the actual subprocess lifecycle
/// (spawn, stderr teeing, timeout enforcement, kill escalation); the
/// domain only specifies the contract.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn execute(&self, request: StageExecutionRequest) -> Result<StageExecutionResult, OrchestratorError>;

    /// Best-effort cancellation of a currently running stage, used on
    /// SIGINT: graceful terminate, grace window, then kill.
    async fn cancel(&self, stage_name: &StageName) -> Result<(), OrchestratorError>;
}
