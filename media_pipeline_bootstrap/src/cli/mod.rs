// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! 1. parser::parse_cli()      parse with clap
//! 2. validator::validate()    security validation
//! 3. ValidatedCli              safe, validated command ready to convert
//!                              into an application-layer command
//! ```
//!
//! `ValidatedCli`/`ValidatedCommand` intentionally use only primitive
//! types (`String`, `Vec<String>`, `Option<...>`) rather than the
//! application crate's domain-flavored command structs - this crate
//! has no dependency on `media-pipeline` and knows nothing about
//! `PrepareJobCommand`/`RunPipelineCommand`. The binary's `main` does
//! that conversion.

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

/// Validated CLI invocation: a command plus the handful of global
/// flags every command shares.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    PrepareJob {
        media: String,
        workflow: String,
        source_language: Option<String>,
        target_languages: Vec<String>,
        start_time: Option<String>,
        end_time: Option<String>,
        estimate_only: bool,
        no_source_separation: bool,
        user: String,
        tmdb_title: Option<String>,
        tmdb_year: Option<i32>,
    },
    RunPipeline {
        job: String,
        resume: bool,
        stages: Vec<String>,
        continue_on_error: bool,
        allow_budget_override: bool,
    },
}

/// Parses argv with clap, then runs every argument through
/// [`SecureArgParser`] before handing back a [`ValidatedCli`].
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(parse_cli())
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let command = match cli.command {
        Commands::PrepareJob {
            media,
            workflow,
            source_language,
            target_languages,
            start_time,
            end_time,
            estimate_only,
            no_source_separation,
            user,
            tmdb_title,
            tmdb_year,
        } => {
            SecureArgParser::validate_media_argument(&media)?;
            SecureArgParser::validate_argument(&workflow)?;
            if let Some(lang) = &source_language {
                SecureArgParser::validate_argument(lang)?;
            }
            for lang in &target_languages {
                SecureArgParser::validate_argument(lang)?;
            }
            if let Some(start) = &start_time {
                SecureArgParser::validate_argument(start)?;
            }
            if let Some(end) = &end_time {
                SecureArgParser::validate_argument(end)?;
            }
            SecureArgParser::validate_argument(&user)?;
            if let Some(title) = &tmdb_title {
                SecureArgParser::validate_argument(title)?;
            }
            if let Some(year) = tmdb_year {
                SecureArgParser::validate_number::<i32>("tmdb-year", &year.to_string(), Some(1870), Some(2100))?;
            }

            ValidatedCommand::PrepareJob {
                media,
                workflow,
                source_language,
                target_languages,
                start_time,
                end_time,
                estimate_only,
                no_source_separation,
                user,
                tmdb_title,
                tmdb_year,
            }
        }
        Commands::RunPipeline {
            job,
            no_resume,
            stages,
            continue_on_error,
            allow_budget_override,
        } => {
            SecureArgParser::validate_argument(&job)?;
            for stage in &stages {
                SecureArgParser::validate_argument(stage)?;
            }

            ValidatedCommand::RunPipeline {
                job,
                resume: !no_resume,
                stages,
                continue_on_error,
                allow_budget_override,
            }
        }
    };

    Ok(ValidatedCli { command, verbose: cli.verbose })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_cli_rejects_dangerous_user_id() {
        let cli = Cli {
            command: Commands::PrepareJob {
                media: "/tmp/in.mp4".to_string(),
                workflow: "transcribe".to_string(),
                source_language: None,
                target_languages: vec![],
                start_time: None,
                end_time: None,
                estimate_only: false,
                no_source_separation: false,
                user: "../etc/passwd".to_string(),
                tmdb_title: None,
                tmdb_year: None,
            },
            verbose: false,
        };
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn validate_cli_flips_no_resume_into_resume() {
        let cli = Cli {
            command: Commands::RunPipeline {
                job: "job-20260101-alice-0001".to_string(),
                no_resume: true,
                stages: vec![],
                continue_on_error: false,
                allow_budget_override: false,
            },
            verbose: false,
        };
        let validated = validate_cli(cli).unwrap();
        match validated.command {
            ValidatedCommand::RunPipeline { resume, .. } => assert!(!resume),
            _ => panic!("expected RunPipeline"),
        }
    }

    #[test]
    fn validate_cli_accepts_youtube_url_as_media() {
        let cli = Cli {
            command: Commands::PrepareJob {
                media: "https://youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                workflow: "transcribe".to_string(),
                source_language: None,
                target_languages: vec![],
                start_time: None,
                end_time: None,
                estimate_only: true,
                no_source_separation: false,
                user: "alice".to_string(),
                tmdb_title: None,
                tmdb_year: None,
            },
            verbose: false,
        };
        assert!(validate_cli(cli).is_ok());
    }
}
