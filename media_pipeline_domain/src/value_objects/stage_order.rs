// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Numeric position of a stage in the registry's 01-15 ordering range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageOrder(u8);

impl StageOrder {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 15;

    pub fn new(value: u8) -> Result<Self, OrchestratorError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(OrchestratorError::ValidationError(format!(
                "stage order {value} out of range {}..={}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_too_large() {
        assert!(StageOrder::new(0).is_err());
        assert!(StageOrder::new(16).is_err());
        assert!(StageOrder::new(1).is_ok());
        assert!(StageOrder::new(15).is_ok());
    }
}
