// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `SubprocessStageExecutor`: launches a stage as an isolated child
//! process, tees its stderr to a per-stage log file, and enforces the
//! wall-clock timeout with graceful-terminate-then-kill escalation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use media_pipeline_domain::repositories::{StageExecutionRequest, StageExecutionResult, StageExecutor};
use media_pipeline_domain::{OrchestratorError, StageName};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tokio::time::timeout;

/// How long a child is given to exit after a graceful terminate signal
/// before the executor escalates to a hard kill.
const GRACE_WINDOW: Duration = Duration::from_secs(10);

/// Resolves an environment name to its interpreter executable path.
pub trait InterpreterResolver: Send + Sync {
    fn interpreter_path(&self, env_name: &str) -> Result<String, OrchestratorError>;
}

/// Looks up interpreter paths from a fixed map, e.g.
/// `{"whisperx": "/opt/envs/whisperx/bin/python"}`, the simplest
/// resolver and the one used outside of environments with a custom venv
/// naming scheme.
pub struct StaticInterpreterResolver {
    paths: HashMap<String, String>,
}

impl StaticInterpreterResolver {
    pub fn new(paths: HashMap<String, String>) -> Self {
        Self { paths }
    }
}

impl InterpreterResolver for StaticInterpreterResolver {
    fn interpreter_path(&self, env_name: &str) -> Result<String, OrchestratorError> {
        self.paths
            .get(env_name)
            .cloned()
            .ok_or_else(|| OrchestratorError::ConfigError(format!("no interpreter configured for environment '{env_name}'")))
    }
}

pub struct SubprocessStageExecutor {
    interpreter_resolver: Arc<dyn InterpreterResolver>,
    running: RwLock<HashMap<String, Arc<tokio::sync::Mutex<Child>>>>,
}

impl SubprocessStageExecutor {
    pub fn new(interpreter_resolver: Arc<dyn InterpreterResolver>) -> Self {
        Self {
            interpreter_resolver,
            running: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl StageExecutor for SubprocessStageExecutor {
    async fn execute(&self, request: StageExecutionRequest) -> Result<StageExecutionResult, OrchestratorError> {
        let interpreter = self.interpreter_resolver.interpreter_path(request.env.as_str())?;

        let mut command = Command::new(&interpreter);
        command
            .arg("-m")
            .arg(format!("stages.{}", request.stage_name))
            .env("JOB_DIR", &request.job_dir)
            .env("STAGE_NAME", request.stage_name.as_str())
            .env("OUTPUT_DIR", &request.stage_output_dir)
            .env("CONFIG_SNAPSHOT", &request.config_snapshot_path)
            .envs(request.credential_env_vars.iter())
            .envs(request.extra_env_vars.iter())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        if let Some(mb) = request.resources.max_memory_hint_mb {
            command.env("MAX_MEMORY_HINT_MB", mb.to_string());
        }

        let mut child = command.spawn().map_err(|e| {
            OrchestratorError::SubprocessCrash(format!("failed to spawn stage '{}': {e}", request.stage_name))
        })?;

        let stderr_log_path = Path::new(&request.job_dir)
            .join("logs")
            .join(format!("{}_stderr.log", request.stage_name))
            .to_string_lossy()
            .into_owned();
        let mut stderr_log = tokio::fs::File::create(&stderr_log_path).await?;

        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                stderr_log.write_all(line.as_bytes()).await.ok();
                stderr_log.write_all(b"\n").await.ok();
            }
        }

        let key = format!("{}:{}", request.job_dir, request.stage_name);
        let pid_key = key.clone();

        let wait_result = timeout(request.timeout, child.wait()).await;

        match wait_result {
            Ok(Ok(status)) => {
                self.running.write().await.remove(&pid_key);
                let exit_code = status.code().unwrap_or(-1);
                if status.success() {
                    Ok(StageExecutionResult {
                        exit_code,
                        outputs: Vec::new(),
                        timed_out: false,
                        stderr_log_path,
                    })
                } else {
                    Err(OrchestratorError::SubprocessCrash(format!(
                        "stage '{}' exited with code {exit_code}",
                        request.stage_name
                    )))
                }
            }
            Ok(Err(e)) => Err(OrchestratorError::SubprocessCrash(format!(
                "error waiting on stage '{}': {e}",
                request.stage_name
            ))),
            Err(_) => {
                let _ = child.start_kill();
                let _ = timeout(GRACE_WINDOW, child.wait()).await;
                self.running.write().await.remove(&pid_key);
                Err(OrchestratorError::Timeout(format!(
                    "stage '{}' exceeded its wall-clock budget of {:?}",
                    request.stage_name,
                    request.timeout
                )))
            }
        }
    }

    async fn cancel(&self, stage_name: &StageName) -> Result<(), OrchestratorError> {
        let running = self.running.read().await;
        for (key, child) in running.iter() {
            if key.ends_with(stage_name.as_str()) {
                let mut child = child.lock().await;
                let _ = child.start_kill();
            }
        }
        Ok(())
    }
}
