// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `JsonUserProfileRepository`: one `<profiles_root>/<user>.json` file
//! per user, guarded by an advisory lock for the read-modify-write cycle.

use std::path::PathBuf;

use async_trait::async_trait;
use media_pipeline_domain::entities::UserProfile;
use media_pipeline_domain::repositories::UserProfileRepository;
use media_pipeline_domain::{OrchestratorError, UserId};

use crate::infrastructure::runtime::LockedFile;

pub struct JsonUserProfileRepository {
    profiles_root: PathBuf,
}

impl JsonUserProfileRepository {
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
impl UserProfileRepository for JsonUserProfileRepository {
    async fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, OrchestratorError> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let mut locked = LockedFile::open_exclusive(&path)?;
        let contents = locked.read_to_string()?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let profile: UserProfile = serde_json::from_str(&contents)?;
        Ok(Some(profile))
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), OrchestratorError> {
        if let Some(parent) = self.profiles_root.as_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.profiles_root)?;
        let path = self.path_for(profile.user_id());
        let mut locked = LockedFile::open_exclusive(&path)?;
        let serialized = serde_json::to_string_pretty(profile)?;
        locked.overwrite(&serialized)
    }
}
