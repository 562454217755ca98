// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed implementations of the domain's repository ports.

mod baseline_cache;
mod cost_ledger;
mod json_manifest;
mod translation_memory;
mod user_profile;
mod youtube_cache;

pub use baseline_cache::FsBaselineCacheRepository;
pub use cost_ledger::JsonCostLedger;
pub use json_manifest::JsonManifestRepository;
pub use translation_memory::FsTranslationMemoryRepository;
pub use user_profile::JsonUserProfileRepository;
pub use youtube_cache::FsYoutubeCacheRepository;
