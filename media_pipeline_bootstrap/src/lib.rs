// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap layer sits **outside** the application's domain and
//! application layers and provides everything a `main` needs before
//! and after the orchestrator runs:
//!
//! - **Argument parsing** - secure CLI parsing and validation ([`cli`])
//! - **Platform abstraction** - OS-specific queries ([`platform`])
//! - **Signal handling** - graceful shutdown on SIGTERM/SIGINT/SIGHUP ([`signals`])
//! - **Shutdown coordination** - cancellation token and grace period ([`shutdown`])
//! - **Exit codes** - mapping results to the process's exit status ([`exit_code`])
//! - **Logging** - a minimal logger for the bootstrap phase itself ([`logger`])
//!
//! ## Architecture Position
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          BOOTSTRAP (This Crate)             │
//! │  - CLI Parsing & Validation                 │
//! │  - Platform Abstraction                     │
//! │  - Signal Handling & Shutdown               │
//! │  - Exit Code Mapping                        │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │         APPLICATION LAYER                   │
//! │  (media_pipeline: use cases, adapters)      │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │           DOMAIN LAYER                      │
//! │  (media_pipeline_domain)                    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! This crate depends only on `media_pipeline_domain` for error types
//! shared with [`exit_code`] - never on `media_pipeline` itself, so the
//! binary crate is the only thing that can depend on both. `ValidatedCli`
//! and `ValidatedCommand` use plain `String`/`Vec<String>`/`Option<...>`
//! fields; converting them into `media_pipeline`'s command structs is
//! the binary's job.

pub mod cli;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ParseError, ValidatedCli, ValidatedCommand};
pub use exit_code::{prepare_job_exit_code, run_pipeline_exit_code, ExitCode};
pub use logger::{BootstrapLogger, ConsoleLogger, NoOpLogger};
pub use platform::{create_platform, Platform, PlatformError};
pub use shutdown::{CancellationToken, ShutdownCoordinator};
pub use signals::{create_signal_handler, ShutdownCallback, SystemSignals};

/// Parses `argv` and runs security validation, in one call.
///
/// The caller is responsible for converting the result into
/// application-layer commands, running them, and mapping the outcome to
/// an exit code with [`prepare_job_exit_code`]/[`run_pipeline_exit_code`].
/// Clap handles `--help`/`--version` and exits the process itself.
pub fn bootstrap_cli() -> Result<ValidatedCli, ParseError> {
    cli::parse_and_validate()
}
