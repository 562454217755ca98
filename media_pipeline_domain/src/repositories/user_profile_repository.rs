// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Port for the per-user profile store.

use async_trait::async_trait;

use crate::entities::UserProfile;
use crate::error::OrchestratorError;
use crate::value_objects::{CostAmount, UserId};

/// Persists and retrieves [`UserProfile`]s.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, OrchestratorError>;

    async fn save(&self, profile: &UserProfile) -> Result<(), OrchestratorError>;

    /// Loads the profile, or bootstraps and persists a fresh one with
    /// `default_ceiling` the first time `user_id` is referenced.
    async fn load_or_bootstrap(
        &self,
        user_id: &UserId,
        default_ceiling: CostAmount,
    ) -> Result<UserProfile, OrchestratorError> {
        if let Some(profile) = self.load(user_id).await? {
            return Ok(profile);
        }
        let profile = UserProfile::bootstrap(user_id.clone(), default_ceiling);
        self.save(&profile).await?;
        Ok(profile)
    }
}
