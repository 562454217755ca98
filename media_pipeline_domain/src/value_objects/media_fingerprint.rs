// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Media identity: a content fingerprint of source media used as the
//! baseline cache key.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::OrchestratorError;

/// SHA-256 fingerprint of the audio-relevant bytes of a source media file:
/// duration plus first/last N KiB plus a sampled middle window, or the full
/// stream when it's small. Used as a cache key for the baseline cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaFingerprint([u8; 32]);

/// Number of leading/trailing kibibytes sampled when the source exceeds
/// [`MediaFingerprint::FULL_STREAM_THRESHOLD_BYTES`].
const SAMPLE_WINDOW_KIB: usize = 64;

impl MediaFingerprint {
    /// Below this size the whole stream is hashed rather than sampled.
    pub const FULL_STREAM_THRESHOLD_BYTES: u64 = 8 * 1024 * 1024;

    /// Computes the fingerprint from a duration hint plus the head, middle,
    /// and tail sample windows read by the caller. Below
    /// [`Self::FULL_STREAM_THRESHOLD_BYTES`], infrastructure is expected to
    /// pass the entire stream as `head` with empty `middle`/`tail`.
    pub fn compute(duration_millis: u64, head: &[u8], middle: &[u8], tail: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(duration_millis.to_le_bytes());
        hasher.update(head);
        hasher.update(middle);
        hasher.update(tail);
        Self(hasher.finalize().into())
    }

    pub fn sample_window_bytes() -> usize {
        SAMPLE_WINDOW_KIB * 1024
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MediaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for MediaFingerprint {
    type Error = OrchestratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&value)
            .map_err(|e| OrchestratorError::ValidationError(format!("invalid fingerprint hex '{value}': {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OrchestratorError::ValidationError(format!("fingerprint '{value}' is not 32 bytes")))?;
        Ok(MediaFingerprint(array))
    }
}

impl From<MediaFingerprint> for String {
    fn from(value: MediaFingerprint) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_yield_same_fingerprint() {
        let a = MediaFingerprint::compute(30_000, b"head", b"mid", b"tail");
        let b = MediaFingerprint::compute(30_000, b"head", b"mid", b"tail");
        assert_eq!(a, b);
    }

    #[test]
    fn different_duration_changes_fingerprint() {
        let a = MediaFingerprint::compute(30_000, b"head", b"", b"");
        let b = MediaFingerprint::compute(31_000, b"head", b"", b"");
        assert_ne!(a, b);
    }
}
