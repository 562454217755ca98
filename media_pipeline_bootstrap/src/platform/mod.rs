// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction
//!
//! The bootstrap layer sits outside the application's hexagon, so it is
//! where OS-specific queries live: default stage memory ceilings are
//! sized off `total_memory`, the job lock file's permissions are set
//! through `set_permissions`, and the default `--base-dir` for
//! downloaded media falls back to `temp_dir` when unset.
//!
//! `Platform` is selected once at startup via [`create_platform`] and
//! threaded through as a `Box<dyn Platform>` rather than matched on
//! `cfg(unix)`/`cfg(windows)` at every call site.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not supported on this platform: {0}")]
    NotSupported(String),

    #[error("platform error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Platform: Send + Sync {
    fn page_size(&self) -> usize;

    fn cpu_count(&self) -> usize;

    fn total_memory(&self) -> Result<u64, PlatformError>;

    fn available_memory(&self) -> Result<u64, PlatformError>;

    fn platform_name(&self) -> &'static str;

    fn temp_dir(&self) -> PathBuf;

    /// Effective-UID-0 on Unix, Administrator on Windows.
    fn is_elevated(&self) -> bool;

    /// Sets Unix permission bits on `path`; a no-op on Windows.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError>;

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError>;
}

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_platform_reports_sane_values() {
        let platform = create_platform();
        assert!(platform.cpu_count() >= 1);
        let page_size = platform.page_size();
        assert!((512..=65536).contains(&page_size));
        assert!(!platform.platform_name().is_empty());
    }
}
