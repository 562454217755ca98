// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! POSIX implementation of [`Platform`] (Linux and macOS).

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Platform, PlatformError};

pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }

    fn memory_info() -> Result<(u64, u64), PlatformError> {
        let contents = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| PlatformError::Other(format!("reading /proc/meminfo: {e}")))?;

        let mut total_kb = None;
        let mut available_kb = None;
        for line in contents.lines() {
            if let Some(value) = line.strip_prefix("MemTotal:") {
                total_kb = parse_kb_field(value);
            } else if let Some(value) = line.strip_prefix("MemAvailable:") {
                available_kb = parse_kb_field(value);
            }
        }

        match (total_kb, available_kb) {
            (Some(total), Some(available)) => Ok((total * 1024, available * 1024)),
            _ => Err(PlatformError::Other("MemTotal/MemAvailable not found in /proc/meminfo".to_string())),
        }
    }
}

fn parse_kb_field(value: &str) -> Option<u64> {
    value.trim().trim_end_matches(" kB").trim().parse().ok()
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for UnixPlatform {
    fn page_size(&self) -> usize {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            4096
        }
    }

    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_info().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_info().map(|(_, available)| available)
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn is_elevated(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    async fn sync_file(&self, file: &tokio::fs::File) -> Result<(), PlatformError> {
        file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_plausible() {
        let platform = UnixPlatform::new();
        assert!(platform.page_size() >= 512);
    }

    #[test]
    fn cpu_count_is_at_least_one() {
        let platform = UnixPlatform::new();
        assert!(platform.cpu_count() >= 1);
    }

    #[test]
    fn platform_name_is_unix_flavored() {
        let platform = UnixPlatform::new();
        assert!(matches!(platform.platform_name(), "linux" | "macos"));
    }

    #[tokio::test]
    async fn set_permissions_round_trips() {
        let platform = UnixPlatform::new();
        let file = tempfile::NamedTempFile::new().unwrap();
        platform.set_permissions(file.path(), 0o600).unwrap();
        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
