// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screenshot and recording files for each job.
//!
//! Screenshots are written once and never rewritten. Step numbers only grow
//! within a job, across runs and restarts. Recordings land in the job's
//! `video/` directory under a temporary name and are renamed to the canonical
//! `recording.<ext>` when a run ends.

use crate::artifact_paths::{self, is_safe_job_id};
use dp_core::{
    artifact::is_valid_slug, canonical_video_name, is_canonical_video_name,
    parse_screenshot_filename, JobId, ScreenshotArtifact,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("job id is not usable as a directory name: {0}")]
    InvalidJobId(String),
    #[error("invalid screenshot slug: {0:?}")]
    InvalidSlug(String),
    #[error("screenshot step {step} does not follow step {last}")]
    StepOutOfOrder { step: u32, last: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finalized recording read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// File store rooted at the artifacts directory, with an in-memory index of
/// screenshot metadata.
pub struct ArtifactStore {
    root: PathBuf,
    index: Mutex<HashMap<JobId, Vec<ScreenshotArtifact>>>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), index: Mutex::new(HashMap::new()) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, job: &JobId) -> Result<PathBuf, ArtifactError> {
        if !is_safe_job_id(job.as_str()) {
            return Err(ArtifactError::InvalidJobId(job.to_string()));
        }
        Ok(artifact_paths::job_dir(&self.root, job.as_str()))
    }

    pub fn video_dir(&self, job: &JobId) -> Result<PathBuf, ArtifactError> {
        self.job_dir(job)?;
        Ok(artifact_paths::video_dir(&self.root, job.as_str()))
    }

    /// Seed the index with metadata persisted by an earlier process.
    /// Does nothing when the job is already indexed.
    pub fn prime(&self, job: &JobId, existing: Vec<ScreenshotArtifact>) {
        self.index.lock().entry(job.clone()).or_insert(existing);
    }

    /// Indexed screenshots in step order, if this process has seen the job.
    pub fn indexed(&self, job: &JobId) -> Option<Vec<ScreenshotArtifact>> {
        self.index.lock().get(job).cloned()
    }

    /// Highest step already used by the job, from the index and the disk.
    pub async fn last_step(&self, job: &JobId) -> Result<u32, ArtifactError> {
        let indexed = self
            .index
            .lock()
            .get(job)
            .and_then(|shots| shots.iter().map(|s| s.step).max())
            .unwrap_or(0);
        let on_disk = self.scan_screenshots(job).await?.iter().map(|s| s.step).max().unwrap_or(0);
        Ok(indexed.max(on_disk))
    }

    /// Write `png` as the screenshot for `step`.
    pub async fn save_screenshot(
        &self,
        job: &JobId,
        step: u32,
        slug: &str,
        label: &str,
        png: &[u8],
        captured_at_ms: u64,
    ) -> Result<ScreenshotArtifact, ArtifactError> {
        if !is_valid_slug(slug) {
            return Err(ArtifactError::InvalidSlug(slug.to_string()));
        }
        let last = self.last_step(job).await?;
        if step <= last {
            return Err(ArtifactError::StepOutOfOrder { step, last });
        }

        let artifact = ScreenshotArtifact {
            step,
            slug: slug.to_string(),
            label: label.to_string(),
            captured_at_ms,
        };
        let dir = self.job_dir(job)?;
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(artifact.filename()), png).await?;

        let mut index = self.index.lock();
        let shots = index.entry(job.clone()).or_default();
        shots.push(artifact.clone());
        shots.sort_by_key(|s| s.step);
        Ok(artifact)
    }

    /// Screenshots found on disk, in step order. Labels are rebuilt from slugs
    /// and capture times from file modification times.
    pub async fn scan_screenshots(
        &self,
        job: &JobId,
    ) -> Result<Vec<ScreenshotArtifact>, ArtifactError> {
        let dir = self.job_dir(job)?;
        let mut shots = Vec::new();
        for (name, path) in list_files(&dir).await? {
            let Some((step, slug)) = parse_screenshot_filename(&name) else {
                continue;
            };
            let captured_at_ms = tokio::fs::metadata(&path)
                .await
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            shots.push(ScreenshotArtifact {
                step,
                slug: slug.to_string(),
                label: slug.replace('-', " "),
                captured_at_ms,
            });
        }
        shots.sort_by_key(|s| s.step);
        Ok(shots)
    }

    /// Bytes of a screenshot. Names that are not `step-<NN>-<slug>.png` are
    /// never read and report `None`, like missing files.
    pub async fn read_screenshot(
        &self,
        job: &JobId,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, ArtifactError> {
        if parse_screenshot_filename(filename).is_none() || !is_safe_job_id(job.as_str()) {
            tracing::debug!(job_id = %job, filename, "rejected screenshot name");
            return Ok(None);
        }
        read_optional(&self.job_dir(job)?.join(filename)).await
    }

    /// Rename the run's raw recording to `recording.<ext>`.
    ///
    /// Returns the canonical name, or `None` when the job has no recording.
    /// Without a new raw file an existing canonical recording is returned
    /// unchanged, so repeated calls are harmless. A new raw file replaces the
    /// recording of an earlier run.
    pub async fn finalize_video(&self, job: &JobId) -> Result<Option<String>, ArtifactError> {
        let dir = self.video_dir(job)?;
        let mut files = list_files(&dir).await?;
        files.sort();

        let raw = files.iter().find_map(|(name, path)| {
            if is_canonical_video_name(name) {
                return None;
            }
            let (_, ext) = name.rsplit_once('.')?;
            let canonical = canonical_video_name(ext);
            is_canonical_video_name(&canonical).then(|| (path.clone(), canonical))
        });

        let Some((raw_path, canonical)) = raw else {
            return Ok(files.into_iter().map(|(name, _)| name).find(|n| is_canonical_video_name(n)));
        };
        for (name, path) in &files {
            if is_canonical_video_name(name) {
                tokio::fs::remove_file(path).await?;
            }
        }
        tokio::fs::rename(&raw_path, dir.join(&canonical)).await?;
        tracing::debug!(job_id = %job, filename = %canonical, "recording finalized");
        Ok(Some(canonical))
    }

    /// Names of finalized recordings.
    pub async fn video_filenames(&self, job: &JobId) -> Result<Vec<String>, ArtifactError> {
        if !is_safe_job_id(job.as_str()) {
            return Ok(Vec::new());
        }
        let mut names: Vec<_> = list_files(&self.video_dir(job)?)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| is_canonical_video_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    pub async fn read_video(&self, job: &JobId) -> Result<Option<VideoFile>, ArtifactError> {
        let Some(filename) = self.video_filenames(job).await?.into_iter().next() else {
            return Ok(None);
        };
        let path = self.video_dir(job)?.join(&filename);
        Ok(read_optional(&path).await?.map(|bytes| VideoFile { filename, bytes }))
    }

    /// Drop the job from the index. Files stay on disk.
    pub fn clear(&self, job: &JobId) {
        self.index.lock().remove(job);
    }
}

/// Regular files in `dir`; a missing directory is empty.
async fn list_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, ArtifactError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push((name.to_string(), entry.path()));
        }
    }
    Ok(files)
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, ArtifactError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
