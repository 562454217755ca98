// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// An optional `[start, end)` time window to clip the source media to,
/// in milliseconds from the start of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipWindow {
    start_millis: u64,
    end_millis: u64,
}

impl ClipWindow {
    pub fn new(start_millis: u64, end_millis: u64) -> Result<Self, OrchestratorError> {
        if end_millis <= start_millis {
            return Err(OrchestratorError::ValidationError(format!(
                "clip window end ({end_millis}ms) must be after start ({start_millis}ms)"
            )));
        }
        Ok(Self { start_millis, end_millis })
    }

    pub fn start_millis(&self) -> u64 {
        self.start_millis
    }

    pub fn end_millis(&self) -> u64 {
        self.end_millis
    }

    pub fn duration_millis(&self) -> u64 {
        self.end_millis - self.start_millis
    }

    /// Checks whether this window is too short to contain any VAD segment
    /// of at least `min_segment_millis`, per the boundary behavior: a clip
    /// shorter than the minimum segment duration must fail loudly in the
    /// VAD/ASR stages rather than silently produce zero segments.
    pub fn shorter_than_min_segment(&self, min_segment_millis: u64) -> bool {
        self.duration_millis() < min_segment_millis
    }

    /// Parses `hh:mm:ss` timestamps into a window.
    pub fn from_timecodes(start: &str, end: &str) -> Result<Self, OrchestratorError> {
        let start_millis = parse_timecode(start)?;
        let end_millis = parse_timecode(end)?;
        Self::new(start_millis, end_millis)
    }
}

fn parse_timecode(raw: &str) -> Result<u64, OrchestratorError> {
    let parts: Vec<&str> = raw.split(':').collect();
    let invalid = || OrchestratorError::ValidationError(format!("invalid timecode '{raw}', expected hh:mm:ss"));
    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (h, m, s),
        _ => return Err(invalid()),
    };
    let h: u64 = h.parse().map_err(|_| invalid())?;
    let m: u64 = m.parse().map_err(|_| invalid())?;
    let s: f64 = s.parse().map_err(|_| invalid())?;
    Ok(h * 3_600_000 + m * 60_000 + (s * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timecodes() {
        let window = ClipWindow::from_timecodes("00:01:00", "00:02:30").unwrap();
        assert_eq!(window.start_millis(), 60_000);
        assert_eq!(window.end_millis(), 150_000);
    }

    #[test]
    fn rejects_inverted_window() {
        assert!(ClipWindow::new(100, 50).is_err());
    }

    #[test]
    fn flags_windows_shorter_than_min_segment() {
        let window = ClipWindow::new(0, 100).unwrap();
        assert!(window.shorter_than_min_segment(250));
    }
}
