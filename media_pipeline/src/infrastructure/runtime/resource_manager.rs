// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-job advisory locking so two orchestrator processes never run
//! stages for the same job concurrently, plus the resource ceiling
//! passed through to a stage's execution request.

use std::path::{Path, PathBuf};

use media_pipeline_domain::repositories::ResourceRequirements;
use media_pipeline_domain::OrchestratorError;

use super::file_lock::LockedFile;

/// Default memory hint handed to a stage when the caller has not
/// configured one, loosely matching what a single ASR or translation
/// stage needs on a workstation-class GPU host.
const DEFAULT_MEMORY_HINT_MB: u64 = 4096;

/// Holds the exclusive lock on a job's directory for the lifetime of a
/// `run-pipeline` invocation. Dropping it releases the lock, allowing a
/// subsequent invocation (e.g. a resume after a crash) to proceed.
pub struct JobResourceGuard {
    _lock: LockedFile,
}

impl JobResourceGuard {
    /// Acquires the per-job lock file at `<job_dir>/.lock`, failing fast
    /// rather than blocking if another process already holds it.
    pub fn acquire(job_dir: &Path) -> Result<Self, OrchestratorError> {
        let lock_path = job_dir.join(".lock");
        let lock = LockedFile::try_open_exclusive(&lock_path)?;
        Ok(Self { _lock: lock })
    }
}

/// Resolves the resource ceiling for a stage. Stages may declare a
/// heavier hint (e.g. ASR on a long clip) via `parameter_hint_mb`; absent
/// that, the process-wide default is used.
pub fn resolve_requirements(parameter_hint_mb: Option<u64>) -> ResourceRequirements {
    ResourceRequirements {
        max_memory_hint_mb: Some(parameter_hint_mb.unwrap_or(DEFAULT_MEMORY_HINT_MB)),
    }
}

/// The path to a job's lock file, exposed for diagnostics/tests.
pub fn lock_path_for(job_dir: &Path) -> PathBuf {
    job_dir.join(".lock")
}
