// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical name of a pipeline stage, e.g. `demux`, `asr`, `mux`.
///
/// Interned as a plain `String` rather than an enum: the registry is the
/// single source of truth for which names exist (`domain::services::stage_registry`),
/// and keeping this a string lets new stages be registered without changing
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageName(String);

impl StageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Computes the stage's subdirectory name `NN_<stage>` given its order.
    pub fn directory_name(&self, order: u8) -> String {
        format!("{order:02}_{}", self.0)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_name_zero_pads_order() {
        let name = StageName::new("demux");
        assert_eq!(name.directory_name(1), "01_demux");
    }
}
