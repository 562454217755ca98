// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// A non-negative USD amount, stored as integer hundredths of a cent to
/// avoid floating-point drift across repeated ledger updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CostAmount {
    micros: u64,
}

const MICROS_PER_USD: u64 = 1_000_000;

impl CostAmount {
    pub const ZERO: CostAmount = CostAmount { micros: 0 };

    pub fn from_usd(usd: f64) -> Result<Self, OrchestratorError> {
        if !usd.is_finite() || usd < 0.0 {
            return Err(OrchestratorError::ValidationError(format!(
                "cost amount must be finite and non-negative, got {usd}"
            )));
        }
        Ok(Self {
            micros: (usd * MICROS_PER_USD as f64).round() as u64,
        })
    }

    pub fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub fn as_usd(&self) -> f64 {
        self.micros as f64 / MICROS_PER_USD as f64
    }

    pub fn micros(&self) -> u64 {
        self.micros
    }

    /// Fraction of `ceiling` this amount represents, in `[0.0, +inf)`.
    pub fn utilization_of(&self, ceiling: CostAmount) -> f64 {
        if ceiling.micros == 0 {
            return if self.micros == 0 { 0.0 } else { f64::INFINITY };
        }
        self.micros as f64 / ceiling.micros as f64
    }
}

impl Add for CostAmount {
    type Output = CostAmount;

    fn add(self, rhs: Self) -> Self::Output {
        CostAmount::from_micros(self.micros + rhs.micros)
    }
}

impl Sub for CostAmount {
    type Output = CostAmount;

    fn sub(self, rhs: Self) -> Self::Output {
        CostAmount::from_micros(self.micros.saturating_sub(rhs.micros))
    }
}

impl Sum for CostAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(CostAmount::ZERO, Add::add)
    }
}

impl fmt::Display for CostAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.4}", self.as_usd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ceiling_is_not_over_budget() {
        let ceiling = CostAmount::from_usd(0.05).unwrap();
        let spent = CostAmount::from_usd(0.05).unwrap();
        assert!((spent.utilization_of(ceiling) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn one_cent_over_exceeds() {
        let ceiling = CostAmount::from_usd(0.05).unwrap();
        let spent = CostAmount::from_usd(0.06).unwrap();
        assert!(spent.utilization_of(ceiling) > 1.0);
    }

    #[test]
    fn rejects_negative() {
        assert!(CostAmount::from_usd(-1.0).is_err());
    }
}
