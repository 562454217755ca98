// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// A BCP-47-ish language code, or `Auto` for source-language detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageCode {
    Auto,
    Code(String),
}

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<Self, OrchestratorError> {
        if raw.eq_ignore_ascii_case("auto") {
            return Ok(LanguageCode::Auto);
        }
        if raw.is_empty() || raw.len() > 8 || !raw.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return Err(OrchestratorError::ValidationError(format!(
                "invalid language code '{raw}'"
            )));
        }
        Ok(LanguageCode::Code(raw.to_ascii_lowercase()))
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, LanguageCode::Auto)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            LanguageCode::Auto => None,
            LanguageCode::Code(c) => Some(c),
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageCode::Auto => write!(f, "auto"),
            LanguageCode::Code(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_is_case_insensitive() {
        assert!(matches!(LanguageCode::parse("AUTO").unwrap(), LanguageCode::Auto));
    }

    #[test]
    fn rejects_garbage() {
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("en_US!").is_err());
    }
}
