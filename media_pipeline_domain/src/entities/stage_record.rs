// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `StageRecord` entity: an append-only execution record for one
//! stage within one job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Artifact, EnvName, StageName, StageOrder, StageParameters};

/// Outcome of one stage execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Running,
    Completed,
    Failed,
}

/// Classification of why a stage failed, mirroring the error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    pub kind: String,
    pub message: String,
}

/// One execution record of one stage within a job. Stage records are
/// append-only: re-running a stage writes a new record and marks the
/// prior one `superseded`, it is never deleted or overwritten in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage_name: StageName,
    pub order: StageOrder,
    pub env: EnvName,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: StageStatus,
    pub exit_code: Option<i32>,
    pub inputs: Vec<Artifact>,
    pub outputs: Vec<Artifact>,
    pub parameters: StageParameters,
    pub error: Option<StageError>,
    pub superseded: bool,
}

impl StageRecord {
    pub fn start(
        stage_name: StageName,
        order: StageOrder,
        env: EnvName,
        parameters: StageParameters,
        inputs: Vec<Artifact>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage_name,
            order,
            env,
            started_at,
            finished_at: None,
            status: StageStatus::Running,
            exit_code: None,
            inputs,
            outputs: Vec::new(),
            parameters,
            error: None,
            superseded: false,
        }
    }

    /// Finalizes this record as completed. All declared outputs must
    /// already be present with matching hashes per the manifest invariant;
    /// the caller (manifest repository) is responsible for that check
    /// before calling this.
    pub fn complete(&mut self, exit_code: i32, outputs: Vec<Artifact>, finished_at: DateTime<Utc>) {
        self.status = StageStatus::Completed;
        self.exit_code = Some(exit_code);
        self.outputs = outputs;
        self.finished_at = Some(finished_at);
    }

    pub fn fail(&mut self, kind: impl Into<String>, message: impl Into<String>, exit_code: Option<i32>, finished_at: DateTime<Utc>) {
        self.status = StageStatus::Failed;
        self.exit_code = exit_code;
        self.error = Some(StageError {
            kind: kind.into(),
            message: message.into(),
        });
        self.finished_at = Some(finished_at);
    }

    pub fn is_completed(&self) -> bool {
        !self.superseded && self.status == StageStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_sets_outputs_and_status() {
        let mut record = StageRecord::start(
            StageName::new("demux"),
            StageOrder::new(1).unwrap(),
            EnvName::new("common"),
            StageParameters::new(),
            Vec::new(),
            Utc::now(),
        );
        record.complete(0, Vec::new(), Utc::now());
        assert!(record.is_completed());
    }

    #[test]
    fn superseded_record_is_not_considered_completed() {
        let mut record = StageRecord::start(
            StageName::new("demux"),
            StageOrder::new(1).unwrap(),
            EnvName::new("common"),
            StageParameters::new(),
            Vec::new(),
            Utc::now(),
        );
        record.complete(0, Vec::new(), Utc::now());
        record.superseded = true;
        assert!(!record.is_completed());
    }
}
