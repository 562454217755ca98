// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error type for the orchestrator domain. Each variant maps
//! directly onto one `Kind` from the error taxonomy: `ConfigError`,
//! `MissingInput`, `CredentialMissing`, `SubprocessCrash`, `Timeout`,
//! `Cancelled`, `BudgetExceeded`, `CacheCorruption`, `ValidationError`, plus
//! the ambient variants needed for conversions from the standard library and
//! `serde_json`.
//!
//! ## Recoverability
//!
//! `is_recoverable()` identifies the kinds the orchestrator retries once
//! with backoff (`Timeout`, `SubprocessCrash`) before turning them fatal.
//! `ConfigError` and `ValidationError` are never retried.

use thiserror::Error;

/// Domain-specific errors for the orchestrator.
#[derive(Error, Debug, Clone)]
pub enum OrchestratorError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    #[error("Subprocess crash: {0}")]
    SubprocessCrash(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl OrchestratorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks whether the orchestrator may retry the failing stage once.
    ///
    /// Only transient, infrastructure-shaped failures are retryable.
    /// Configuration and validation failures are deterministic and retrying
    /// them would just reproduce the same failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OrchestratorError::Timeout(_) | OrchestratorError::SubprocessCrash(_))
    }

    /// Checks whether this error should ever be retried, including
    /// cache-layer misses which are opportunistic by design.
    pub fn is_retryable_as_cache_miss(&self) -> bool {
        matches!(self, OrchestratorError::CacheCorruption(_))
    }

    /// Gets the error category, used for metrics labels and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            OrchestratorError::ConfigError(_) => "config",
            OrchestratorError::MissingInput(_) => "missing_input",
            OrchestratorError::CredentialMissing(_) => "credential_missing",
            OrchestratorError::SubprocessCrash(_) => "subprocess_crash",
            OrchestratorError::Timeout(_) => "timeout",
            OrchestratorError::Cancelled(_) => "cancelled",
            OrchestratorError::BudgetExceeded(_) => "budget_exceeded",
            OrchestratorError::CacheCorruption(_) => "cache_corruption",
            OrchestratorError::ValidationError(_) => "validation",
            OrchestratorError::IoError(_) => "io",
            OrchestratorError::SerializationError(_) => "serialization",
            OrchestratorError::LockError(_) => "lock",
            OrchestratorError::InternalError(_) => "internal",
        }
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(err: std::io::Error) -> Self {
        OrchestratorError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        OrchestratorError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_crash_are_recoverable() {
        assert!(OrchestratorError::Timeout("t".into()).is_recoverable());
        assert!(OrchestratorError::SubprocessCrash("c".into()).is_recoverable());
    }

    #[test]
    fn config_and_validation_are_not_recoverable() {
        assert!(!OrchestratorError::ConfigError("x".into()).is_recoverable());
        assert!(!OrchestratorError::ValidationError("x".into()).is_recoverable());
    }

    #[test]
    fn category_matches_kind() {
        assert_eq!(OrchestratorError::BudgetExceeded("x".into()).category(), "budget_exceeded");
    }
}
