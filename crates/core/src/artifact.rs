// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screenshot and video artifact naming.
//!
//! Screenshots are stored as `step-<NN>-<slug>.png`. Anything that does not
//! match that pattern is never served back.

use serde::{Deserialize, Serialize};

/// Stem of a finalized session recording (`recording.<ext>`).
pub const VIDEO_CANONICAL_STEM: &str = "recording";

/// Metadata for one captured protocol step. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotArtifact {
    /// Strictly increasing per job, starting at 1.
    pub step: u32,
    pub slug: String,
    pub label: String,
    pub captured_at_ms: u64,
}

impl ScreenshotArtifact {
    pub fn filename(&self) -> String {
        screenshot_filename(self.step, &self.slug)
    }
}

/// Build the on-disk name for a screenshot.
pub fn screenshot_filename(step: u32, slug: &str) -> String {
    format!("step-{:02}-{}.png", step, slug)
}

/// A slug is non-empty lowercase ASCII alphanumerics and dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Parse `step-<NN>-<slug>.png` into `(step, slug)`.
pub fn parse_screenshot_filename(name: &str) -> Option<(u32, &str)> {
    let rest = name.strip_prefix("step-")?.strip_suffix(".png")?;
    let (digits, slug) = rest.split_once('-')?;
    if digits.len() < 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let step: u32 = digits.parse().ok()?;
    if step == 0 || !is_valid_slug(slug) {
        return None;
    }
    Some((step, slug))
}

/// Whether `name` is the canonical name of a finalized recording.
pub fn is_canonical_video_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => stem == VIDEO_CANONICAL_STEM && is_valid_extension(ext),
        None => false,
    }
}

/// Canonical name for a recording with the given extension.
pub fn canonical_video_name(ext: &str) -> String {
    format!("{}.{}", VIDEO_CANONICAL_STEM, ext)
}

fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Human label to slug (`"Login page"` → `"login-page"`).
pub fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
