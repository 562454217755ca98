// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Selects the shape of the plan: `transcribe`, `translate`, or `subtitle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowVariant {
    Transcribe,
    Translate,
    Subtitle,
}

impl WorkflowVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowVariant::Transcribe => "transcribe",
            WorkflowVariant::Translate => "translate",
            WorkflowVariant::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for WorkflowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkflowVariant {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcribe" => Ok(WorkflowVariant::Transcribe),
            "translate" => Ok(WorkflowVariant::Translate),
            "subtitle" => Ok(WorkflowVariant::Subtitle),
            other => Err(OrchestratorError::ValidationError(format!(
                "unknown workflow variant '{other}'"
            ))),
        }
    }
}
