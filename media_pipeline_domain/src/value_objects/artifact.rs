// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use super::content_hash::ContentHash;

/// A file produced or consumed by a stage, identified by its path within
/// the job tree and a SHA-256 content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to the job root, e.g. `06_asr/asr_transcript.txt`.
    pub relative_path: String,
    pub sha256: ContentHash,
    pub size_bytes: u64,
}

impl Artifact {
    pub fn new(relative_path: impl Into<String>, sha256: ContentHash, size_bytes: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            sha256,
            size_bytes,
        }
    }

    /// Checks the `<stage>_<language>_<descriptor>.<ext>` filename
    /// convention with no leading punctuation, and that the path lives
    /// under the given stage's own subdirectory.
    pub fn validate_location(&self, stage_dir: &str) -> bool {
        let in_stage_dir = self.relative_path.starts_with(stage_dir);
        let filename = self.relative_path.rsplit('/').next().unwrap_or(&self.relative_path);
        let no_leading_punctuation = filename
            .chars()
            .next()
            .map(|c| c.is_alphanumeric())
            .unwrap_or(false);
        in_stage_dir && no_leading_punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_artifact_outside_its_stage_directory() {
        let artifact = Artifact::new("07_alignment/out.json", ContentHash::digest(b"x"), 10);
        assert!(!artifact.validate_location("06_asr/"));
        assert!(artifact.validate_location("07_alignment/"));
    }

    #[test]
    fn rejects_leading_punctuation_filename() {
        let artifact = Artifact::new("06_asr/.hidden.json", ContentHash::digest(b"x"), 10);
        assert!(!artifact.validate_location("06_asr/"));
    }
}
