// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Code Management
//!
//! Two layers of exit codes are in play. Unexpected failures - a clap
//! parse error, a panic recovered at the top of `main`, an I/O error
//! before a command even starts - use [`ExitCode`], a general-purpose
//! BSD `sysexits.h`-style code. Once a command actually runs,
//! `prepare-job` and `run-pipeline` each have their own small, fixed
//! exit code contract (`prepare_job_exit_code`, `run_pipeline_exit_code`)
//! that scripts calling this binary are meant to depend on.

use std::fmt;

use media_pipeline_domain::OrchestratorError;

/// General-purpose exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,
    UsageError = 64,
    DataError = 65,
    NoInput = 66,
    Unavailable = 69,
    Software = 70,
    IoError = 74,
    Config = 78,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps an [`OrchestratorError`] that escaped before a command's own
    /// exit-code contract applies (bootstrap-layer setup failures).
    pub fn from_orchestrator_error(error: &OrchestratorError) -> Self {
        match error {
            OrchestratorError::ConfigError(_) => ExitCode::Config,
            OrchestratorError::ValidationError(_) | OrchestratorError::MissingInput(_) => ExitCode::UsageError,
            OrchestratorError::CredentialMissing(_) => ExitCode::NoInput,
            OrchestratorError::IoError(_) => ExitCode::IoError,
            OrchestratorError::SerializationError(_) => ExitCode::DataError,
            OrchestratorError::Cancelled(_) => ExitCode::Interrupted,
            OrchestratorError::InternalError(_) | OrchestratorError::LockError(_) => ExitCode::Software,
            _ => ExitCode::Error,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::IoError => "I/O error",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

/// `prepare-job`'s exit code contract: 0 created, 2 validation error, 3
/// missing credential, 4 budget refusal.
pub fn prepare_job_exit_code(result: &Result<(), OrchestratorError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(OrchestratorError::CredentialMissing(_)) => 3,
        Err(OrchestratorError::BudgetExceeded(_)) => 4,
        Err(OrchestratorError::ValidationError(_))
        | Err(OrchestratorError::ConfigError(_))
        | Err(OrchestratorError::MissingInput(_)) => 2,
        Err(_) => 1,
    }
}

/// `run-pipeline`'s exit code contract: 0 completed, 1 stage failed, 2
/// plan error, 130 cancelled.
pub fn run_pipeline_exit_code(result: &Result<(), OrchestratorError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(OrchestratorError::Cancelled(_)) => 130,
        Err(OrchestratorError::ValidationError(_)) | Err(OrchestratorError::ConfigError(_)) => 2,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values_match_sysexits() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::UsageError.as_i32(), 64);
        assert_eq!(ExitCode::Config.as_i32(), 78);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn prepare_job_maps_credential_and_budget_distinctly() {
        assert_eq!(prepare_job_exit_code(&Ok(())), 0);
        assert_eq!(prepare_job_exit_code(&Err(OrchestratorError::CredentialMissing("x".into()))), 3);
        assert_eq!(prepare_job_exit_code(&Err(OrchestratorError::BudgetExceeded("x".into()))), 4);
        assert_eq!(prepare_job_exit_code(&Err(OrchestratorError::ValidationError("x".into()))), 2);
        assert_eq!(prepare_job_exit_code(&Err(OrchestratorError::SubprocessCrash("x".into()))), 1);
    }

    #[test]
    fn run_pipeline_maps_cancellation_to_130() {
        assert_eq!(run_pipeline_exit_code(&Ok(())), 0);
        assert_eq!(run_pipeline_exit_code(&Err(OrchestratorError::Cancelled("x".into()))), 130);
        assert_eq!(run_pipeline_exit_code(&Err(OrchestratorError::ConfigError("x".into()))), 2);
        assert_eq!(run_pipeline_exit_code(&Err(OrchestratorError::Timeout("x".into()))), 1);
    }
}
