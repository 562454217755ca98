// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Port for the per-user monthly cost ledger.

use async_trait::async_trait;

use crate::error::OrchestratorError;
use crate::value_objects::{CostAmount, UserId};

/// The ledger's current state for one user's billing month.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub cumulative_usage: CostAmount,
    pub budget_ceiling: CostAmount,
}

/// Persists and updates per-user monthly cost totals. Implementations
/// guard concurrent per-user writes with an OS-level advisory lock, since
/// two orchestrators for different jobs owned by the same user may run
/// concurrently.
#[async_trait]
pub trait CostLedgerRepository: Send + Sync {
    async fn load(&self, user_id: &UserId) -> Result<LedgerSnapshot, OrchestratorError>;

    /// Appends `amount` to the user's cumulative usage for the current
    /// billing month.
    async fn record_usage(&self, user_id: &UserId, amount: CostAmount) -> Result<(), OrchestratorError>;
}
