// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `Job` entity: a single end-to-end orchestration run.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ClipWindow, CostAmount, JobId, LanguageCode, MediaFingerprint, UserId, WorkflowVariant};

/// Where the source media comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MediaSource {
    LocalPath(String),
    Url(String),
}

/// Lifecycle state of a job, written atomically to `manifest.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Directory and config materialized; no stage has run.
    Prepared,
    /// At least one stage has started; no required stage has failed fatally.
    Running,
    /// The final stage for the chosen workflow recorded success.
    Completed,
    /// A required stage recorded failure and no resume is in progress.
    Failed,
}

impl JobStatus {
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }

    pub fn allows_resume(&self) -> bool {
        matches!(self, JobStatus::Prepared | JobStatus::Running | JobStatus::Failed | JobStatus::Completed)
    }
}

/// The `Job` entity. Identity is [`JobId`]; everything else is mutable
/// configuration and lifecycle state that the [`super::super::aggregates::JobAggregate`]
/// guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    user_id: UserId,
    source_media: MediaSource,
    workflow: WorkflowVariant,
    source_language: LanguageCode,
    target_languages: BTreeSet<String>,
    clip_window: Option<ClipWindow>,
    enabled_optional_stages: BTreeSet<String>,
    cost_ceiling: Option<CostAmount>,
    /// Content fingerprint of the source media, computed at ingest time;
    /// `None` when ingest could not read the file to sample it (e.g. a
    /// remote URL ingest failure partway through). The baseline cache key.
    media_fingerprint: Option<MediaFingerprint>,
    status: JobStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cumulative_cost: CostAmount,
}

impl Job {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: JobId,
        user_id: UserId,
        source_media: MediaSource,
        workflow: WorkflowVariant,
        source_language: LanguageCode,
        target_languages: BTreeSet<String>,
        clip_window: Option<ClipWindow>,
        enabled_optional_stages: BTreeSet<String>,
        cost_ceiling: Option<CostAmount>,
        media_fingerprint: Option<MediaFingerprint>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            source_media,
            workflow,
            source_language,
            target_languages,
            clip_window,
            enabled_optional_stages,
            cost_ceiling,
            media_fingerprint,
            status: JobStatus::Prepared,
            created_at,
            updated_at: created_at,
            cumulative_cost: CostAmount::ZERO,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn source_media(&self) -> &MediaSource {
        &self.source_media
    }

    pub fn workflow(&self) -> WorkflowVariant {
        self.workflow
    }

    pub fn source_language(&self) -> &LanguageCode {
        &self.source_language
    }

    pub fn target_languages(&self) -> &BTreeSet<String> {
        &self.target_languages
    }

    pub fn clip_window(&self) -> Option<ClipWindow> {
        self.clip_window
    }

    pub fn enabled_optional_stages(&self) -> &BTreeSet<String> {
        &self.enabled_optional_stages
    }

    pub fn cost_ceiling(&self) -> Option<CostAmount> {
        self.cost_ceiling
    }

    pub fn media_fingerprint(&self) -> Option<MediaFingerprint> {
        self.media_fingerprint
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn cumulative_cost(&self) -> CostAmount {
        self.cumulative_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn set_status(&mut self, status: JobStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }

    pub(crate) fn accrue_cost(&mut self, amount: CostAmount, at: DateTime<Utc>) {
        self.cumulative_cost = self.cumulative_cost + amount;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::UserId;

    fn sample_job() -> Job {
        Job::new(
            JobId::new("20260315", "alice", 1).unwrap(),
            UserId::new("alice").unwrap(),
            MediaSource::LocalPath("/media/in.wav".into()),
            WorkflowVariant::Transcribe,
            LanguageCode::Auto,
            BTreeSet::new(),
            None,
            BTreeSet::new(),
            None,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn new_job_starts_prepared_with_zero_cost() {
        let job = sample_job();
        assert_eq!(job.status(), JobStatus::Prepared);
        assert_eq!(job.cumulative_cost(), CostAmount::ZERO);
    }
}
