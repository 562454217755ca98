// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `RunPipelineUseCase`: a thin wrapper delegating to the [`Orchestrator`]
//! application service, kept as its own use case for symmetry with
//! `prepare-job` and so the bootstrap CLI has one entry point per command.

use std::sync::Arc;

use media_pipeline_domain::OrchestratorError;

use crate::application::commands::{RunPipelineCommand, RunPipelineResult};
use crate::application::services::Orchestrator;

pub struct RunPipelineUseCase {
    orchestrator: Arc<Orchestrator>,
}

impl RunPipelineUseCase {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn execute(&self, cmd: RunPipelineCommand) -> Result<RunPipelineResult, OrchestratorError> {
        self.orchestrator.run(cmd).await
    }
}
