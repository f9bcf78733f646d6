// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn store() -> (ArtifactStore, TempDir) {
    let dir = TempDir::new().unwrap();
    (ArtifactStore::new(dir.path()), dir)
}

fn job() -> JobId {
    JobId::from("job-abc")
}

#[tokio::test]
async fn saved_screenshot_is_written_and_indexed() {
    let (store, dir) = store();

    let artifact =
        store.save_screenshot(&job(), 1, "login-page", "Login page", PNG, 1_000).await.unwrap();

    assert_eq!(artifact.filename(), "step-01-login-page.png");
    let on_disk = std::fs::read(dir.path().join("job-abc/step-01-login-page.png")).unwrap();
    assert_eq!(on_disk, PNG);
    assert_eq!(store.indexed(&job()).unwrap(), vec![artifact]);
}

#[yare::parameterized(
    repeated = { 2 },
    earlier  = { 1 },
)]
fn step_must_increase(step: u32) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let (store, _dir) = store();
        store.save_screenshot(&job(), 2, "first", "First", PNG, 1).await.unwrap();

        let err = store.save_screenshot(&job(), step, "second", "Second", PNG, 2).await.unwrap_err();
        assert!(matches!(err, ArtifactError::StepOutOfOrder { last: 2, .. }));
    });
}

#[tokio::test]
async fn invalid_slug_is_rejected() {
    let (store, _dir) = store();
    let err = store.save_screenshot(&job(), 1, "../escape", "x", PNG, 1).await.unwrap_err();
    assert!(matches!(err, ArtifactError::InvalidSlug(_)));
}

#[tokio::test]
async fn unsafe_job_id_is_rejected_for_writes() {
    let (store, _dir) = store();
    let err = store
        .save_screenshot(&JobId::from("../other"), 1, "login", "Login", PNG, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ArtifactError::InvalidJobId(_)));
}

#[tokio::test]
async fn steps_continue_after_a_restart() {
    let (first, dir) = store();
    first.save_screenshot(&job(), 3, "application", "Application", PNG, 1).await.unwrap();

    let second = ArtifactStore::new(dir.path());
    assert_eq!(second.last_step(&job()).await.unwrap(), 3);
    assert!(second.save_screenshot(&job(), 3, "again", "Again", PNG, 2).await.is_err());
    assert!(second.save_screenshot(&job(), 4, "again", "Again", PNG, 2).await.is_ok());
}

#[tokio::test]
async fn disk_scan_skips_foreign_files() {
    let (store, dir) = store();
    let job_dir = dir.path().join("job-abc");
    std::fs::create_dir_all(&job_dir).unwrap();
    std::fs::write(job_dir.join("step-02-form-filled.png"), PNG).unwrap();
    std::fs::write(job_dir.join("step-01-login-page.png"), PNG).unwrap();
    std::fs::write(job_dir.join("job.log"), "x").unwrap();
    std::fs::write(job_dir.join("step-1-short.png"), PNG).unwrap();

    let shots = store.scan_screenshots(&job()).await.unwrap();

    let names: Vec<_> = shots.iter().map(ScreenshotArtifact::filename).collect();
    assert_eq!(names, vec!["step-01-login-page.png", "step-02-form-filled.png"]);
    assert_eq!(shots[1].label, "form filled");
}

#[tokio::test]
async fn reads_only_screenshot_names() {
    let (store, dir) = store();
    store.save_screenshot(&job(), 1, "login-page", "Login page", PNG, 1).await.unwrap();
    std::fs::write(dir.path().join("job-abc/job.log"), "secret-ish").unwrap();

    let bytes = store.read_screenshot(&job(), "step-01-login-page.png").await.unwrap();
    assert_eq!(bytes.as_deref(), Some(PNG));
    assert_eq!(store.read_screenshot(&job(), "job.log").await.unwrap(), None);
    assert_eq!(store.read_screenshot(&job(), "../job-abc/job.log").await.unwrap(), None);
    assert_eq!(store.read_screenshot(&job(), "step-09-missing.png").await.unwrap(), None);
    assert_eq!(
        store.read_screenshot(&JobId::from(".."), "step-01-login-page.png").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn finalize_without_recording_is_none() {
    let (store, _dir) = store();
    assert_eq!(store.finalize_video(&job()).await.unwrap(), None);
    assert!(store.video_filenames(&job()).await.unwrap().is_empty());
}

#[tokio::test]
async fn finalize_renames_once() {
    let (store, _dir) = store();
    let video_dir = store.video_dir(&job()).unwrap();
    std::fs::create_dir_all(&video_dir).unwrap();
    std::fs::write(video_dir.join("raw-k2j4.webm"), b"webm").unwrap();

    assert_eq!(store.finalize_video(&job()).await.unwrap().as_deref(), Some("recording.webm"));
    assert_eq!(store.finalize_video(&job()).await.unwrap().as_deref(), Some("recording.webm"));

    assert!(!video_dir.join("raw-k2j4.webm").exists());
    assert_eq!(store.video_filenames(&job()).await.unwrap(), vec!["recording.webm"]);
}

#[tokio::test]
async fn newer_raw_recording_replaces_the_old_one() {
    let (store, _dir) = store();
    let video_dir = store.video_dir(&job()).unwrap();
    std::fs::create_dir_all(&video_dir).unwrap();
    std::fs::write(video_dir.join("recording.webm"), b"old").unwrap();
    std::fs::write(video_dir.join("raw-next.mjpeg"), b"new").unwrap();

    assert_eq!(store.finalize_video(&job()).await.unwrap().as_deref(), Some("recording.mjpeg"));

    assert_eq!(store.video_filenames(&job()).await.unwrap(), vec!["recording.mjpeg"]);
    let video = store.read_video(&job()).await.unwrap().unwrap();
    assert_eq!(video, VideoFile { filename: "recording.mjpeg".to_string(), bytes: b"new".to_vec() });
}

#[tokio::test]
async fn prime_keeps_existing_index() {
    let (store, _dir) = store();
    let saved = store.save_screenshot(&job(), 1, "login-page", "Login page", PNG, 1).await.unwrap();

    store.prime(&job(), Vec::new());
    assert_eq!(store.indexed(&job()).unwrap(), vec![saved]);

    store.clear(&job());
    assert!(store.indexed(&job()).is_none());
}
