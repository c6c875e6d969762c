// Lectern Media Assembler
// Copyright (c) 2026 The Lectern Authors
//
// Downloads the resolved clip URLs sequentially, then joins them with
// FFmpeg's concat demuxer (`-f concat -c copy`): a lossless copy-mux,
// so the first clip's parameters govern the output container. Clips
// with mismatched dimensions are passed through untouched.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

pub struct Assembler {
    client: reqwest::Client,
    work_dir: PathBuf,
}

impl Assembler {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            work_dir: work_dir.into(),
        }
    }

    /// Download every clip in order. The Nth file on disk corresponds
    /// to the Nth URL.
    pub async fn download_clips(&self, urls: &[String]) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .with_context(|| format!("creating {}", self.work_dir.display()))?;

        let mut files = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let path = self.work_dir.join(format!("clip_{i:03}.mp4"));
            info!("[ASSEMBLER] Downloading clip {}/{}", i + 1, urls.len());

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .with_context(|| format!("downloading {url}"))?;
            let bytes = resp.bytes().await?;
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            files.push(path);
        }
        Ok(files)
    }

    /// Download and concatenate; returns the merged output path.
    pub async fn assemble(&self, urls: &[String], output: &Path) -> Result<PathBuf> {
        let files = self.download_clips(urls).await?;
        concat_clips(&files, output).await
    }
}

/// Build the FFmpeg concat manifest: one `file '<absolute_path>'` line
/// per clip. Entries must be absolute: the concat demuxer resolves
/// relative entries against the manifest's own directory, not the
/// process working directory, so a relative work dir would double up
/// (`videos/videos/clip_000.mp4`).
pub fn concat_manifest(files: &[PathBuf]) -> String {
    let cwd = std::env::current_dir().unwrap_or_default();
    files
        .iter()
        .map(|p| {
            let absolute = if p.is_absolute() {
                p.clone()
            } else {
                cwd.join(p)
            };
            format!("file '{}'", absolute.to_string_lossy())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join the clips into one container via the concat demuxer.
pub async fn concat_clips(files: &[PathBuf], output: &Path) -> Result<PathBuf> {
    if files.is_empty() {
        bail!("no clips to concatenate");
    }

    let manifest_path = output.with_extension("concat_manifest.txt");
    tokio::fs::write(&manifest_path, concat_manifest(files))
        .await
        .context("writing concat manifest")?;
    info!(
        "[ASSEMBLER] Manifest written ({} clips): {}",
        files.len(),
        manifest_path.display()
    );

    let status = Command::new("ffmpeg")
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&manifest_path)
        .args(["-c", "copy"])
        .arg(output)
        .status()
        .await
        .context("spawning ffmpeg")?;

    let _ = tokio::fs::remove_file(&manifest_path).await;

    if status.success() {
        info!("[ASSEMBLER] ✅ Merged output: {}", output.display());
        Ok(output.to_path_buf())
    } else {
        error!("[ASSEMBLER] FFmpeg concat failed with {}", status);
        bail!("ffmpeg concat failed");
    }
}
