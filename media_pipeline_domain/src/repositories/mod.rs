// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Repository ports (traits): infrastructure-facing seams the domain
//! depends on but never implements.

mod cache;
mod cost_ledger;
mod manifest_repository;
mod stage_executor;
mod user_profile_repository;

pub use cache::{
    BaselineCacheEntry, BaselineCacheRepository, TranslationMemoryRepository, YoutubeCacheRepository,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use cost_ledger::{CostLedgerRepository, LedgerSnapshot};
pub use manifest_repository::ManifestRepository;
pub use stage_executor::{ResourceRequirements, StageExecutionRequest, StageExecutionResult, StageExecutor};
pub use user_profile_repository::UserProfileRepository;
