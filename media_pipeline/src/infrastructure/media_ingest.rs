// /////////////////////////////////////////////////////////////////////////////
// Media Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `YtDlpMediaIngestPort`: resolves `--media` into a local file.
//!
//! A plain local path is probed for duration via `ffprobe` and used as
//! is. A YouTube/Vimeo URL is checked against the download cache first;
//! on a miss, `yt-dlp` downloads it to `in/online/<video_id>.<ext>`, and
//! the result is cached for the next job pointing at the same URL.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use media_pipeline_domain::repositories::YoutubeCacheRepository;
use media_pipeline_domain::value_objects::{Artifact, ContentHash, MediaFingerprint};
use media_pipeline_domain::OrchestratorError;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::process::Command;

use crate::application::ports::{IngestedMedia, MediaIngestPort};

static YOUTUBE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|shorts/)([A-Za-z0-9_-]{6,})").expect("static pattern is valid")
});

static VIMEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("static pattern is valid"));

pub struct YtDlpMediaIngestPort {
    online_cache_dir: PathBuf,
    youtube_cache: Arc<dyn YoutubeCacheRepository>,
}

impl YtDlpMediaIngestPort {
    pub fn new(online_cache_dir: impl Into<PathBuf>, youtube_cache: Arc<dyn YoutubeCacheRepository>) -> Self {
        Self {
            online_cache_dir: online_cache_dir.into(),
            youtube_cache,
        }
    }
}

/// Extracts a canonical video id from a YouTube or Vimeo URL, used as the
/// download cache key.
fn canonical_video_id(url: &str) -> Option<String> {
    YOUTUBE_ID_PATTERN
        .captures(url)
        .or_else(|| VIMEO_ID_PATTERN.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_remote(media: &str) -> bool {
    media.starts_with("http://") || media.starts_with("https://")
}

#[async_trait]
impl MediaIngestPort for YtDlpMediaIngestPort {
    async fn ingest(&self, media: &str) -> Result<IngestedMedia, OrchestratorError> {
        if !is_remote(media) {
            let duration_millis = probe_duration_millis(media).await?;
            let media_fingerprint = compute_fingerprint(media, duration_millis).await;
            return Ok(IngestedMedia {
                local_path: media.to_string(),
                duration_millis,
                from_cache: false,
                media_fingerprint,
            });
        }

        let video_id = canonical_video_id(media).ok_or_else(|| {
            OrchestratorError::ValidationError(format!("'{media}' is not a recognized YouTube/Vimeo URL"))
        })?;

        if let Some(cached) = self.youtube_cache.lookup(&video_id).await? {
            let duration_millis = probe_duration_millis(&cached.relative_path).await?;
            let media_fingerprint = compute_fingerprint(&cached.relative_path, duration_millis).await;
            tracing::info!(video_id = %video_id, "youtube download cache hit");
            return Ok(IngestedMedia {
                local_path: cached.relative_path,
                duration_millis,
                from_cache: true,
                media_fingerprint,
            });
        }

        tokio::fs::create_dir_all(&self.online_cache_dir).await?;
        let output_template = self.online_cache_dir.join(format!("{video_id}.%(ext)s"));

        let status = Command::new("yt-dlp")
            .arg("-o")
            .arg(&output_template)
            .arg(media)
            .status()
            .await
            .map_err(|e| OrchestratorError::SubprocessCrash(format!("failed to launch yt-dlp: {e}")))?;
        if !status.success() {
            return Err(OrchestratorError::SubprocessCrash(format!(
                "yt-dlp exited with status {status} fetching '{media}'"
            )));
        }

        let downloaded_path = find_downloaded_file(&self.online_cache_dir, &video_id).await?;
        let bytes = tokio::fs::read(&downloaded_path).await?;
        let artifact = Artifact::new(
            downloaded_path.to_string_lossy().into_owned(),
            ContentHash::digest(&bytes),
            bytes.len() as u64,
        );
        self.youtube_cache.store(&video_id, artifact.clone()).await?;

        let duration_millis = probe_duration_millis(&artifact.relative_path).await?;
        let media_fingerprint = compute_fingerprint(&artifact.relative_path, duration_millis).await;
        Ok(IngestedMedia {
            local_path: artifact.relative_path,
            duration_millis,
            from_cache: false,
            media_fingerprint,
        })
    }
}

/// Samples a baseline cache key from `path`: the whole file when it's at
/// or under [`MediaFingerprint::FULL_STREAM_THRESHOLD_BYTES`], otherwise
/// head/middle/tail windows of [`MediaFingerprint::sample_window_bytes`].
/// Any I/O failure degrades to `None` - fingerprinting is opportunistic,
/// never a reason to fail ingest.
async fn compute_fingerprint(path: &str, duration_millis: u64) -> Option<MediaFingerprint> {
    let mut file = tokio::fs::File::open(path).await.ok()?;
    let size = file.metadata().await.ok()?.len();
    let window = MediaFingerprint::sample_window_bytes() as u64;

    if size <= MediaFingerprint::FULL_STREAM_THRESHOLD_BYTES {
        let mut head = Vec::new();
        file.read_to_end(&mut head).await.ok()?;
        return Some(MediaFingerprint::compute(duration_millis, &head, &[], &[]));
    }

    let mut head = vec![0u8; window as usize];
    file.read_exact(&mut head).await.ok()?;

    let middle_start = size / 2 - window / 2;
    file.seek(std::io::SeekFrom::Start(middle_start)).await.ok()?;
    let mut middle = vec![0u8; window as usize];
    file.read_exact(&mut middle).await.ok()?;

    let tail_start = size - window;
    file.seek(std::io::SeekFrom::Start(tail_start)).await.ok()?;
    let mut tail = vec![0u8; window as usize];
    file.read_exact(&mut tail).await.ok()?;

    Some(MediaFingerprint::compute(duration_millis, &head, &middle, &tail))
}

/// Finds the file `yt-dlp` actually wrote for `video_id`, whose extension
/// isn't known ahead of time.
async fn find_downloaded_file(dir: &std::path::Path, video_id: &str) -> Result<PathBuf, OrchestratorError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(video_id) {
            return Ok(entry.path());
        }
    }
    Err(OrchestratorError::SubprocessCrash(format!(
        "yt-dlp reported success but no output file for '{video_id}' was found"
    )))
}

/// Probes a local media file's duration via `ffprobe`.
async fn probe_duration_millis(path: &str) -> Result<u64, OrchestratorError> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .await
        .map_err(|e| OrchestratorError::SubprocessCrash(format!("failed to launch ffprobe: {e}")))?;
    if !output.status.success() {
        return Err(OrchestratorError::SubprocessCrash(format!(
            "ffprobe failed to read duration for '{path}'"
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let seconds: f64 = stdout
        .trim()
        .parse()
        .map_err(|_| OrchestratorError::SubprocessCrash(format!("ffprobe returned non-numeric duration for '{path}'")))?;
    Ok((seconds * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_youtube_id_from_watch_url() {
        assert_eq!(
            canonical_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_youtube_id_from_short_url() {
        assert_eq!(canonical_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn extracts_vimeo_id() {
        assert_eq!(canonical_video_id("https://vimeo.com/123456789"), Some("123456789".to_string()));
    }

    #[test]
    fn rejects_unrecognized_url() {
        assert_eq!(canonical_video_id("https://example.com/video.mp4"), None);
    }
}
