// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `JsonCostLedger`: per-user monthly cost totals backed by the same
//! advisory-locked JSON file the user profile lives in: budget ceiling
//! and cumulative usage are profile fields rather than a separate
//! ledger store.

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::entities::UserProfile;
use media_pipeline_domain::repositories::{CostLedgerRepository, LedgerSnapshot};
use media_pipeline_domain::value_objects::CostAmount;
use media_pipeline_domain::{OrchestratorError, UserId};

use crate::infrastructure::runtime::LockedFile;

pub struct JsonCostLedger {
    profiles_root: PathBuf,
}

impl JsonCostLedger {
    pub fn new(profiles_root: impl Into<PathBuf>) -> Self {
        Self {
            profiles_root: profiles_root.into(),
        }
    }

    fn path_for(&self, user_id: &UserId) -> PathBuf {
        self.profiles_root.join(format!("{user_id}.json"))
    }
}

#[async_trait]
impl CostLedgerRepository for JsonCostLedger {
    async fn load(&self, user_id: &UserId) -> Result<LedgerSnapshot, OrchestratorError> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(LedgerSnapshot {
                cumulative_usage: CostAmount::ZERO,
                budget_ceiling: CostAmount::ZERO,
            });
        }
        let mut locked = LockedFile::open_exclusive(&path)?;
        let contents = locked.read_to_string()?;
        let profile: UserProfile = serde_json::from_str(&contents)?;
        Ok(LedgerSnapshot {
            cumulative_usage: profile.cumulative_usage(),
            budget_ceiling: profile.budget_ceiling(),
        })
    }

    async fn record_usage(&self, user_id: &UserId, amount: CostAmount) -> Result<(), OrchestratorError> {
        let path = self.path_for(user_id);
        let mut locked = LockedFile::open_exclusive(&path)?;
        let contents = locked.read_to_string()?;
        let mut profile: UserProfile = serde_json::from_str(&contents)?;
        profile.record_usage(amount);
        let serialized = serde_json::to_string_pretty(&profile)?;
        locked.overwrite(&serialized)
    }
}
