// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame-sampling page recorder.
//!
//! Captures a JPEG of the viewport at a fixed interval and appends it to a
//! raw MJPEG stream (`raw-<id>.mjpeg`) in the video directory. The stream is
//! complete once the recorder is stopped; the artifact store renames it to its
//! canonical name afterwards.

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Consecutive capture failures after which recording gives up.
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

pub(super) const RAW_EXTENSION: &str = "mjpeg";

pub(super) struct FrameRecorder {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    path: PathBuf,
}

impl FrameRecorder {
    pub(super) async fn start(
        page: Page,
        video_dir: &Path,
        interval: Duration,
    ) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(video_dir).await?;
        let path = video_dir.join(format!("raw-{}.{}", nanoid::nanoid!(10), RAW_EXTENSION));
        let file = tokio::fs::File::create(&path).await?;
        let cancel = CancellationToken::new();
        let task = tokio::spawn(sample_frames(page, file, interval, cancel.clone()));
        Ok(Self { cancel, task, path })
    }

    /// Stop sampling and wait for the stream to be flushed.
    pub(super) async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(path = %self.path.display(), error = %e, "frame recorder task failed");
        }
    }
}

async fn sample_frames(
    page: Page,
    mut file: tokio::fs::File,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut failures = 0u32;
    let params = || {
        ScreenshotParams::builder().format(CaptureScreenshotFormat::Jpeg).quality(60).build()
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        match page.screenshot(params()).await {
            Ok(frame) => {
                failures = 0;
                if let Err(e) = file.write_all(&frame).await {
                    tracing::warn!(error = %e, "failed to write video frame, stopping recording");
                    break;
                }
            }
            Err(e) => {
                failures += 1;
                if failures >= MAX_CONSECUTIVE_FAILURES {
                    tracing::debug!(error = %e, "page stopped producing frames");
                    break;
                }
            }
        }
    }

    if let Err(e) = file.flush().await {
        tracing::warn!(error = %e, "failed to flush video stream");
    }
}
