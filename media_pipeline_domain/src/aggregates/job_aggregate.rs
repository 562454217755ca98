// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `JobAggregate`: consistency boundary around a [`Job`] and its
//! [`StageRecord`] history, built the way event-sourced aggregates are
//! built throughout this domain - state is derived by folding a stream of
//! [`JobEvent`]s, and every mutation appends to an uncommitted buffer the
//! application layer drains and persists.

use chrono::{DateTime, Utc};

use crate::entities::{Job, JobStatus, StageRecord, StageStatus};
use crate::error::OrchestratorError;
use crate::events::JobEvent;
use crate::value_objects::{Artifact, EnvName, JobId, StageName, StageOrder, StageParameters};

/// Aggregate root guarding a job's invariants: stage records are
/// append-only, only one stage record for a given name is "current"
/// (non-superseded) at a time, and the job's lifecycle status can only
/// move forward (`prepared` -> `running` -> `completed`/`failed`, with
/// `failed` -> `running` permitted on resume).
#[derive(Debug, Clone)]
pub struct JobAggregate {
    job: Job,
    stage_records: Vec<StageRecord>,
    version: u64,
    uncommitted_events: Vec<JobEvent>,
}

impl JobAggregate {
    /// Creates a brand-new aggregate and records its creation event.
    pub fn new(job: Job) -> Self {
        let event = JobEvent::JobCreated {
            job_id: job.id().clone(),
            occurred_at: job.created_at(),
        };
        Self {
            job,
            stage_records: Vec::new(),
            version: 1,
            uncommitted_events: vec![event],
        }
    }

    /// Reconstructs an aggregate purely from its event history, without
    /// emitting new uncommitted events - used when loading from storage.
    pub fn from_events(job: Job, events: Vec<JobEvent>) -> Result<Self, OrchestratorError> {
        let mut aggregate = Self {
            job,
            stage_records: Vec::new(),
            version: 0,
            uncommitted_events: Vec::new(),
        };
        for event in events {
            aggregate.apply_event(&event)?;
            aggregate.version += 1;
        }
        Ok(aggregate)
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn stage_records(&self) -> &[StageRecord] {
        &self.stage_records
    }

    /// The current (non-superseded) record for a stage, if any.
    pub fn current_record(&self, stage_name: &StageName) -> Option<&StageRecord> {
        self.stage_records
            .iter()
            .rev()
            .find(|r| &r.stage_name == stage_name && !r.superseded)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn uncommitted_events(&self) -> &[JobEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn record_and_apply(&mut self, event: JobEvent) -> Result<(), OrchestratorError> {
        self.apply_event(&event)?;
        self.version += 1;
        self.uncommitted_events.push(event);
        Ok(())
    }

    /// Starts a new stage execution, superseding any prior record for the
    /// same stage name.
    #[allow(clippy::too_many_arguments)]
    pub fn start_stage(
        &mut self,
        stage_name: StageName,
        order: StageOrder,
        env: EnvName,
        parameters: StageParameters,
        inputs: Vec<Artifact>,
        at: DateTime<Utc>,
    ) -> Result<(), OrchestratorError> {
        if self.job.status() == JobStatus::Completed {
            return Err(OrchestratorError::ValidationError(format!(
                "cannot start stage '{stage_name}' on already-completed job '{}'",
                self.job.id()
            )));
        }
        if let Some(current) = self.current_record(&stage_name) {
            if current.status == StageStatus::Running {
                return Err(OrchestratorError::ValidationError(format!(
                    "stage '{stage_name}' already running for job '{}'",
                    self.job.id()
                )));
            }
            self.record_and_apply(JobEvent::StageSuperseded {
                job_id: self.job.id().clone(),
                stage_name: stage_name.clone(),
                occurred_at: at,
            })?;
        }
        if self.job.status() == JobStatus::Prepared || self.job.status() == JobStatus::Failed {
            self.job.set_status(JobStatus::Running, at);
        }
        self.record_and_apply(JobEvent::StageStarted {
            job_id: self.job.id().clone(),
            stage_name,
            order,
            env,
            parameters,
            inputs,
            occurred_at: at,
        })
    }

    pub fn complete_stage(
        &mut self,
        stage_name: StageName,
        exit_code: i32,
        outputs: Vec<Artifact>,
        at: DateTime<Utc>,
    ) -> Result<(), OrchestratorError> {
        self.record_and_apply(JobEvent::StageCompleted {
            job_id: self.job.id().clone(),
            stage_name,
            exit_code,
            outputs,
            occurred_at: at,
        })
    }

    pub fn fail_stage(
        &mut self,
        stage_name: StageName,
        kind: impl Into<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
        at: DateTime<Utc>,
    ) -> Result<(), OrchestratorError> {
        use crate::entities::StageError;
        self.record_and_apply(JobEvent::StageFailed {
            job_id: self.job.id().clone(),
            stage_name,
            error: StageError {
                kind: kind.into(),
                message: message.into(),
            },
            exit_code,
            occurred_at: at,
        })
    }

    /// Marks the job complete. Only valid once the workflow's terminal
    /// stage has a completed record - callers (the orchestrator) are
    /// responsible for checking that before calling this.
    pub fn complete_job(&mut self, at: DateTime<Utc>) -> Result<(), OrchestratorError> {
        self.record_and_apply(JobEvent::JobCompleted {
            job_id: self.job.id().clone(),
            occurred_at: at,
        })
    }

    pub fn fail_job(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), OrchestratorError> {
        self.record_and_apply(JobEvent::JobFailed {
            job_id: self.job.id().clone(),
            reason: reason.into(),
            occurred_at: at,
        })
    }

    fn apply_event(&mut self, event: &JobEvent) -> Result<(), OrchestratorError> {
        match event {
            JobEvent::JobCreated { .. } => {}
            JobEvent::StageStarted {
                stage_name,
                order,
                env,
                parameters,
                inputs,
                occurred_at,
                ..
            } => {
                self.stage_records.push(StageRecord::start(
                    stage_name.clone(),
                    *order,
                    env.clone(),
                    parameters.clone(),
                    inputs.clone(),
                    *occurred_at,
                ));
            }
            JobEvent::StageCompleted {
                stage_name,
                exit_code,
                outputs,
                occurred_at,
                ..
            } => {
                let record = self.find_current_record_mut(stage_name)?;
                record.complete(*exit_code, outputs.clone(), *occurred_at);
            }
            JobEvent::StageFailed {
                stage_name,
                error,
                exit_code,
                occurred_at,
                ..
            } => {
                let record = self.find_current_record_mut(stage_name)?;
                record.fail(error.kind.clone(), error.message.clone(), *exit_code, *occurred_at);
            }
            JobEvent::StageSuperseded { stage_name, .. } => {
                let record = self.find_current_record_mut(stage_name)?;
                record.superseded = true;
            }
            JobEvent::JobCompleted { occurred_at, .. } => {
                self.job.set_status(JobStatus::Completed, *occurred_at);
            }
            JobEvent::JobFailed { occurred_at, .. } => {
                self.job.set_status(JobStatus::Failed, *occurred_at);
            }
        }
        Ok(())
    }

    fn find_current_record_mut(&mut self, stage_name: &StageName) -> Result<&mut StageRecord, OrchestratorError> {
        self.stage_records
            .iter_mut()
            .rev()
            .find(|r| &r.stage_name == stage_name && !r.superseded)
            .ok_or_else(|| {
                OrchestratorError::InternalError(format!(
                    "no current stage record for '{stage_name}' when applying event"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MediaSource;
    use crate::value_objects::{LanguageCode, UserId, WorkflowVariant};
    use std::collections::BTreeSet;

    fn sample_aggregate() -> JobAggregate {
        let job = Job::new(
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
        );
        JobAggregate::new(job)
    }

    #[test]
    fn rerunning_a_stage_supersedes_the_prior_record() {
        let mut agg = sample_aggregate();
        let now = Utc::now();
        agg.start_stage(
            StageName::new("demux"),
            StageOrder::new(1).unwrap(),
            EnvName::new("common"),
            StageParameters::new(),
            Vec::new(),
            now,
        )
        .unwrap();
        agg.fail_stage(StageName::new("demux"), "SubprocessCrash", "boom", Some(1), now).unwrap();
        agg.start_stage(
            StageName::new("demux"),
            StageOrder::new(1).unwrap(),
            EnvName::new("common"),
            StageParameters::new(),
            Vec::new(),
            now,
        )
        .unwrap();

        let records: Vec<_> = agg.stage_records().iter().filter(|r| r.stage_name.as_str() == "demux").collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].superseded);
        assert!(!records[1].superseded);
    }

    #[test]
    fn from_events_reconstructs_same_state_as_live_mutation() {
        let mut live = sample_aggregate();
        let now = Utc::now();
        live.start_stage(
            StageName::new("demux"),
            StageOrder::new(1).unwrap(),
            EnvName::new("common"),
            StageParameters::new(),
            Vec::new(),
            now,
        )
        .unwrap();
        live.complete_stage(StageName::new("demux"), 0, Vec::new(), now).unwrap();

        let events = live.uncommitted_events().to_vec();
        let job = Job::new(
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
            now,
        );
        let replayed = JobAggregate::from_events(job, events).unwrap();
        assert_eq!(replayed.stage_records().len(), live.stage_records().len());
        assert!(replayed.current_record(&StageName::new("demux")).unwrap().is_completed());
    }
}
