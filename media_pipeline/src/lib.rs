// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Media Pipeline Application & Infrastructure
//!
//! This crate implements the use cases and infrastructure adapters that
//! make the [`media_pipeline_domain`] layer runnable: subprocess stage
//! execution, JSON-file persistence for manifests/profiles/ledgers, the
//! filesystem-backed cache layers, layered configuration loading,
//! structured logging, and Prometheus metrics.
//!
//! ## Architecture
//!
//! - `application`: use cases (`prepare_job`, `run_pipeline`,
//!   `estimate_cost`) and the `Orchestrator` application service that
//!   drives a job's plan to completion.
//! - `infrastructure`: adapters implementing the domain's repository
//!   ports, plus the ambient config/logging/metrics stack.

pub mod application;
pub mod infrastructure;

pub use application::services::orchestrator::Orchestrator;
