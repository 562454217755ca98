// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Port for loading and persisting a job's manifest.
//!
//! Infrastructure implements this against `manifest.json` with
//! temp-file-plus-rename atomic writes; the domain only knows the shape
//! of the operation, not the storage format.

use async_trait::async_trait;

use crate::aggregates::JobAggregate;
use crate::error::OrchestratorError;
use crate::value_objects::JobId;

/// Persists and retrieves [`JobAggregate`]s by [`JobId`].
#[async_trait]
pub trait ManifestRepository: Send + Sync {
    /// Loads a job's full aggregate (job + stage records) by replaying its
    /// event history, or `Ok(None)` if no manifest exists yet.
    async fn load(&self, job_id: &JobId) -> Result<Option<JobAggregate>, OrchestratorError>;

    /// Persists the aggregate's uncommitted events atomically. Callers
    /// must call [`JobAggregate::mark_events_committed`] only after this
    /// returns `Ok`.
    async fn save(&self, aggregate: &JobAggregate) -> Result<(), OrchestratorError>;

    /// Checks whether a manifest already exists for `job_id`, without
    /// paying the cost of a full load.
    async fn exists(&self, job_id: &JobId) -> Result<bool, OrchestratorError>;
}
