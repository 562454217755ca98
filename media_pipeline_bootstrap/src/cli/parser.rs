// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Defines the CLI's argument structure with clap; security validation
//! happens afterward, in [`crate::cli::validator`].

use clap::{Parser, Subcommand};

/// Media pipeline orchestrator: turns one media file or URL into a
/// transcript, translation, or burned-in/sidecar subtitle set.
#[derive(Parser, Debug, Clone)]
#[command(name = "media-pipeline")]
#[command(about = concat!("Media Pipeline Orchestrator v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Allocate a job id, download/probe the source media, and write
    /// the initial manifest - without running any stage.
    PrepareJob {
        /// Local path or http(s) URL (YouTube/Vimeo are cached) to the
        /// source media.
        #[arg(long)]
        media: String,

        /// transcribe | translate | subtitle
        #[arg(long)]
        workflow: String,

        /// BCP-47 source language code, or "auto" to detect it.
        #[arg(short = 's', long)]
        source_language: Option<String>,

        /// Target language code; repeat for multiple targets.
        #[arg(short = 't', long = "target-language")]
        target_languages: Vec<String>,

        /// Clip start, "hh:mm:ss". Requires --end-time.
        #[arg(long)]
        start_time: Option<String>,

        /// Clip end, "hh:mm:ss". Requires --start-time.
        #[arg(long)]
        end_time: Option<String>,

        /// Forecast the job's cost and exit without materializing it.
        #[arg(long)]
        estimate_only: bool,

        /// Skip the source-separation stage even if the workflow would
        /// otherwise enable it.
        #[arg(long)]
        no_source_separation: bool,

        /// User id the job and its budget ceiling are charged against.
        #[arg(long)]
        user: String,

        /// Movie/show title to resolve via TMDB for the glossary stage.
        #[arg(long)]
        tmdb_title: Option<String>,

        /// Release year, disambiguates the TMDB title lookup.
        #[arg(long)]
        tmdb_year: Option<i32>,
    },

    /// Drive a previously prepared job's plan to completion.
    RunPipeline {
        /// The job id returned by `prepare-job`.
        #[arg(short, long)]
        job: String,

        /// Disable resume (on by default): re-run every planned stage
        /// instead of skipping ones the manifest already completed.
        #[arg(long)]
        no_resume: bool,

        /// Comma-separated stage names to restrict this run to.
        #[arg(long, value_delimiter = ',')]
        stages: Vec<String>,

        /// Keep running subsequent stages after a non-fatal stage
        /// failure instead of stopping the job.
        #[arg(long)]
        continue_on_error: bool,

        /// Proceed past the monthly budget ceiling for this run even if
        /// a paid-service stage would otherwise be refused.
        #[arg(long)]
        allow_budget_override: bool,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
