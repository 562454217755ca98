// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Job identity: `job-YYYYMMDD-<user>-<seq>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Uniquely identifies a job: `job-YYYYMMDD-<user>-<seq>`, where `seq` is
/// zero-padded and monotonically assigned per `(date, user)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId {
    date: String,
    user: String,
    seq: u32,
}

impl JobId {
    /// Creates a new job id from its parts, validating `date` is `YYYYMMDD`.
    pub fn new(date: impl Into<String>, user: impl Into<String>, seq: u32) -> Result<Self, OrchestratorError> {
        let date = date.into();
        let user = user.into();
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return Err(OrchestratorError::ValidationError(format!(
                "job id date must be YYYYMMDD, got '{date}'"
            )));
        }
        if user.is_empty() || user.contains('/') {
            return Err(OrchestratorError::ValidationError(format!(
                "invalid user id in job id: '{user}'"
            )));
        }
        Ok(Self { date, user, seq })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Computes the job directory segments relative to the output root:
    /// `YYYY/MM/DD/<user>/<seq>`.
    pub fn directory_segments(&self) -> (String, String, String, String, String) {
        let year = &self.date[0..4];
        let month = &self.date[4..6];
        let day = &self.date[6..8];
        (
            year.to_string(),
            month.to_string(),
            day.to_string(),
            self.user.clone(),
            format!("{:04}", self.seq),
        )
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}-{}-{:04}", self.date, self.user, self.seq)
    }
}

impl FromStr for JobId {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("job-").ok_or_else(|| {
            OrchestratorError::ValidationError(format!("job id must start with 'job-': '{s}'"))
        })?;
        let mut parts = rest.splitn(3, '-');
        let date = parts.next().unwrap_or_default();
        let user = parts.next().unwrap_or_default();
        let seq = parts.next().unwrap_or_default();
        let seq: u32 = seq
            .parse()
            .map_err(|_| OrchestratorError::ValidationError(format!("invalid job id sequence in '{s}'")))?;
        JobId::new(date, user, seq)
    }
}

impl TryFrom<String> for JobId {
    type Error = OrchestratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JobId> for String {
    fn from(value: JobId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let id = JobId::new("20260315", "alice", 7).unwrap();
        let rendered = id.to_string();
        assert_eq!(rendered, "job-20260315-alice-0007");
        let parsed: JobId = rendered.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(JobId::new("2026-03-15", "alice", 1).is_err());
    }

    #[test]
    fn directory_segments_split_date() {
        let id = JobId::new("20260315", "alice", 1).unwrap();
        assert_eq!(
            id.directory_segments(),
            ("2026".into(), "03".into(), "15".into(), "alice".into(), "0001".into())
        );
    }
}
