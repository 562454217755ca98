// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::OrchestratorError;

/// A SHA-256 content hash, the unit artifacts are addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hashes a byte slice in one shot.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = OrchestratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&value)
            .map_err(|e| OrchestratorError::ValidationError(format!("invalid hex hash '{value}': {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OrchestratorError::ValidationError(format!("hash '{value}' is not 32 bytes")))?;
        Ok(ContentHash(array))
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_round_trips_through_hex() {
        let hash = ContentHash::digest(b"hello world");
        let hex = hash.to_hex();
        let parsed: ContentHash = hex.clone().try_into().unwrap();
        assert_eq!(parsed, hash);
        assert_eq!(hex.len(), 64);
    }

    #[test]
    fn rejects_short_hash() {
        let result: Result<ContentHash, _> = "abcd".to_string().try_into();
        assert!(result.is_err());
    }
}
