// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! OS advisory file locking for the sequence counter, the cost ledger,
//! the user profile file, and the per-job lock file - everything the
//! spec calls out as guarded, append-style shared state.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;
use media_pipeline_domain::OrchestratorError;

/// An advisory-locked file handle. The lock is released when this value
/// is dropped.
pub struct LockedFile {
    file: File,
}

impl LockedFile {
    /// Opens `path` (creating it if absent) and blocks until an
    /// exclusive advisory lock is acquired.
    pub fn open_exclusive(path: &Path) -> Result<Self, OrchestratorError> {
        let file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
        file.lock_exclusive()
            .map_err(|e| OrchestratorError::LockError(format!("failed to lock '{}': {e}", path.display())))?;
        Ok(Self { file })
    }

    /// Attempts to acquire the lock without blocking; used for the
    /// per-job lock file's "acquire or fail fast" policy.
    pub fn try_open_exclusive(path: &Path) -> Result<Self, OrchestratorError> {
        let file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| OrchestratorError::LockError(format!("job lock '{}' is held by another process", path.display())))?;
        Ok(Self { file })
    }

    pub fn read_to_string(&mut self) -> Result<String, OrchestratorError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        self.file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    pub fn overwrite(&mut self, contents: &str) -> Result<(), OrchestratorError> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file.write_all(contents.as_bytes())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Allocates the next sequence number for `(date, user)` by locking a
/// per-`(date, user)` counter file, reading its current value, and
/// writing back the increment before releasing the lock.
pub fn next_sequence(counter_path: &Path) -> Result<u32, OrchestratorError> {
    let mut locked = LockedFile::open_exclusive(counter_path)?;
    let contents = locked.read_to_string()?;
    let current: u32 = contents.trim().parse().unwrap_or(0);
    let next = current + 1;
    locked.overwrite(&next.to_string())?;
    Ok(next)
}
