// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services: stateful coordinators that sit above the use
//! cases and below the domain, wiring repositories and ports together.

pub mod cancellation;
pub mod orchestrator;

pub use cancellation::CancellationToken;
pub use orchestrator::Orchestrator;
