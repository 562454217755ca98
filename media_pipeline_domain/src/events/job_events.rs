// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain events recording facts about a job's history. These back the
//! event-sourced reconstruction of [`crate::aggregates::JobAggregate`]
//! and are also the natural shape for structured log/audit lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::StageError;
use crate::value_objects::{Artifact, EnvName, JobId, StageName, StageOrder, StageParameters};

/// A fact about something that already happened to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum JobEvent {
    JobCreated {
        job_id: JobId,
        occurred_at: DateTime<Utc>,
    },
    StageStarted {
        job_id: JobId,
        stage_name: StageName,
        order: StageOrder,
        env: EnvName,
        parameters: StageParameters,
        inputs: Vec<Artifact>,
        occurred_at: DateTime<Utc>,
    },
    StageCompleted {
        job_id: JobId,
        stage_name: StageName,
        exit_code: i32,
        outputs: Vec<Artifact>,
        occurred_at: DateTime<Utc>,
    },
    StageFailed {
        job_id: JobId,
        stage_name: StageName,
        error: StageError,
        exit_code: Option<i32>,
        occurred_at: DateTime<Utc>,
    },
    StageSuperseded {
        job_id: JobId,
        stage_name: StageName,
        occurred_at: DateTime<Utc>,
    },
    JobCompleted {
        job_id: JobId,
        occurred_at: DateTime<Utc>,
    },
    JobFailed {
        job_id: JobId,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobEvent::JobCreated { job_id, .. }
            | JobEvent::StageStarted { job_id, .. }
            | JobEvent::StageCompleted { job_id, .. }
            | JobEvent::StageFailed { job_id, .. }
            | JobEvent::StageSuperseded { job_id, .. }
            | JobEvent::JobCompleted { job_id, .. }
            | JobEvent::JobFailed { job_id, .. } => job_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            JobEvent::JobCreated { occurred_at, .. }
            | JobEvent::StageStarted { occurred_at, .. }
            | JobEvent::StageCompleted { occurred_at, .. }
            | JobEvent::StageFailed { occurred_at, .. }
            | JobEvent::StageSuperseded { occurred_at, .. }
            | JobEvent::JobCompleted { occurred_at, .. }
            | JobEvent::JobFailed { occurred_at, .. } => *occurred_at,
        }
    }
}
