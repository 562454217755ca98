// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `UserProfile` entity: per-user credentials and budget.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{CostAmount, UserId};

/// Per-user record holding credentials, monthly budget ceiling, and
/// cumulative usage. Referenced by jobs, never embedded in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    user_id: UserId,
    /// Credential tokens keyed by service name, e.g. `"HF_TOKEN"`, `"OPENAI_API_KEY"`.
    credentials: BTreeMap<String, String>,
    budget_ceiling: CostAmount,
    cumulative_usage: CostAmount,
    youtube_account: bool,
}

impl UserProfile {
    /// Creates a new profile with zero usage, the way the bootstrap path
    /// does the first time a user is referenced.
    pub fn bootstrap(user_id: UserId, budget_ceiling: CostAmount) -> Self {
        Self {
            user_id,
            credentials: BTreeMap::new(),
            budget_ceiling,
            cumulative_usage: CostAmount::ZERO,
            youtube_account: false,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn credential(&self, service: &str) -> Option<&str> {
        self.credentials.get(service).map(String::as_str)
    }

    pub fn set_credential(&mut self, service: impl Into<String>, token: impl Into<String>) {
        self.credentials.insert(service.into(), token.into());
    }

    pub fn budget_ceiling(&self) -> CostAmount {
        self.budget_ceiling
    }

    pub fn set_budget_ceiling(&mut self, ceiling: CostAmount) {
        self.budget_ceiling = ceiling;
    }

    pub fn cumulative_usage(&self) -> CostAmount {
        self.cumulative_usage
    }

    pub fn youtube_account(&self) -> bool {
        self.youtube_account
    }

    pub fn set_youtube_account(&mut self, enabled: bool) {
        self.youtube_account = enabled;
    }

    /// Records usage against this month's ledger.
    pub fn record_usage(&mut self, amount: CostAmount) {
        self.cumulative_usage = self.cumulative_usage + amount;
    }

    /// Fraction of the monthly ceiling consumed, in `[0.0, +inf)`.
    pub fn utilization(&self) -> f64 {
        self.cumulative_usage.utilization_of(self.budget_ceiling)
    }

    /// Checks whether this profile is at or above the 80% warning
    /// threshold used by the cost tracker's budget gate.
    pub fn is_near_budget_limit(&self) -> bool {
        self.utilization() >= 0.80
    }

    /// Checks whether accruing `additional` would cross the monthly
    /// ceiling.
    pub fn would_exceed_budget(&self, additional: CostAmount) -> bool {
        (self.cumulative_usage + additional).utilization_of(self.budget_ceiling) > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_profile_has_zero_usage() {
        let profile = UserProfile::bootstrap(UserId::new("alice").unwrap(), CostAmount::from_usd(10.0).unwrap());
        assert_eq!(profile.cumulative_usage(), CostAmount::ZERO);
        assert!(!profile.is_near_budget_limit());
    }

    #[test]
    fn exact_budget_is_not_exceeded_but_one_cent_over_is() {
        let mut profile = UserProfile::bootstrap(UserId::new("alice").unwrap(), CostAmount::from_usd(0.05).unwrap());
        assert!(!profile.would_exceed_budget(CostAmount::from_usd(0.05).unwrap()));
        assert!(profile.would_exceed_budget(CostAmount::from_usd(0.06).unwrap()));
        profile.record_usage(CostAmount::from_usd(0.04).unwrap());
        assert!(profile.is_near_budget_limit());
    }
}
