// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! CQRS-style commands and results for the two CLI entry points.

use std::collections::BTreeSet;

use media_pipeline_domain::{CostAmount, JobId, WorkflowVariant};

/// Command for `prepare-job`.
#[derive(Debug, Clone)]
pub struct PrepareJobCommand {
    pub media: String,
    pub workflow: WorkflowVariant,
    pub source_language: Option<String>,
    pub target_languages: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub estimate_only: bool,
    pub no_source_separation: bool,
    pub user: String,
    pub tmdb_title: Option<String>,
    pub tmdb_year: Option<i32>,
}

impl PrepareJobCommand {
    pub fn builder(media: impl Into<String>, workflow: WorkflowVariant, user: impl Into<String>) -> PrepareJobCommandBuilder {
        PrepareJobCommandBuilder {
            media: media.into(),
            workflow,
            user: user.into(),
            source_language: None,
            target_languages: Vec::new(),
            start_time: None,
            end_time: None,
            estimate_only: false,
            no_source_separation: false,
            tmdb_title: None,
            tmdb_year: None,
        }
    }
}

/// Builder for [`PrepareJobCommand`], mirroring the CLI flag surface.
pub struct PrepareJobCommandBuilder {
    media: String,
    workflow: WorkflowVariant,
    user: String,
    source_language: Option<String>,
    target_languages: Vec<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    estimate_only: bool,
    no_source_separation: bool,
    tmdb_title: Option<String>,
    tmdb_year: Option<i32>,
}

impl PrepareJobCommandBuilder {
    pub fn source_language(mut self, value: impl Into<String>) -> Self {
        self.source_language = Some(value.into());
        self
    }

    pub fn target_language(mut self, value: impl Into<String>) -> Self {
        self.target_languages.push(value.into());
        self
    }

    pub fn clip_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn estimate_only(mut self, value: bool) -> Self {
        self.estimate_only = value;
        self
    }

    pub fn no_source_separation(mut self, value: bool) -> Self {
        self.no_source_separation = value;
        self
    }

    pub fn tmdb(mut self, title: impl Into<String>, year: i32) -> Self {
        self.tmdb_title = Some(title.into());
        self.tmdb_year = Some(year);
        self
    }

    pub fn build(self) -> PrepareJobCommand {
        PrepareJobCommand {
            media: self.media,
            workflow: self.workflow,
            source_language: self.source_language,
            target_languages: self.target_languages,
            start_time: self.start_time,
            end_time: self.end_time,
            estimate_only: self.estimate_only,
            no_source_separation: self.no_source_separation,
            user: self.user,
            tmdb_title: self.tmdb_title,
            tmdb_year: self.tmdb_year,
        }
    }
}

/// Result of `prepare-job`.
///
/// `job_id`/`job_dir` are `None` when the command was run with
/// `--estimate-only`: the estimator ran but no job was materialized.
#[derive(Debug, Clone)]
pub struct PrepareJobResult {
    pub job_id: Option<JobId>,
    pub job_dir: Option<String>,
    pub estimated_cost: Option<CostAmount>,
}

/// Command for `run-pipeline`.
#[derive(Debug, Clone)]
pub struct RunPipelineCommand {
    pub job_id: JobId,
    pub resume: bool,
    pub stages: Option<BTreeSet<String>>,
    pub continue_on_error: bool,
    /// Proceed past the monthly budget ceiling for this run even if a
    /// paid-service stage would otherwise be refused.
    pub allow_budget_override: bool,
}

impl RunPipelineCommand {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            resume: true,
            stages: None,
            continue_on_error: false,
            allow_budget_override: false,
        }
    }

    pub fn no_resume(mut self) -> Self {
        self.resume = false;
        self
    }

    pub fn only_stages(mut self, stages: BTreeSet<String>) -> Self {
        self.stages = Some(stages);
        self
    }

    pub fn continue_on_error(mut self, value: bool) -> Self {
        self.continue_on_error = value;
        self
    }

    pub fn allow_budget_override(mut self, value: bool) -> Self {
        self.allow_budget_override = value;
        self
    }
}

/// Result of `run-pipeline`.
#[derive(Debug, Clone)]
pub struct RunPipelineResult {
    pub job_id: JobId,
    pub completed: bool,
    pub executed_stages: Vec<String>,
    pub skipped_stages: Vec<String>,
    pub total_cost: CostAmount,
}
