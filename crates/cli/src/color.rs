// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use dp_core::JobStatus;
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    pub const GOOD: u8 = 108;
    pub const WARN: u8 = 179;
    pub const BAD: u8 = 167;
}

/// `NO_COLOR=1` wins over `COLOR=1`; otherwise color only on a terminal.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// Help output in the same palette as command output.
pub fn styles() -> Styles {
    match should_colorize() {
        true => Styles::styled()
            .header(fg(codes::HEADER))
            .literal(fg(codes::LITERAL))
            .placeholder(fg(codes::CONTEXT))
            .error(fg(codes::BAD)),
        false => Styles::plain(),
    }
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Job status, colored by outcome.
pub fn status(status: JobStatus) -> String {
    let code = match status {
        JobStatus::Completed => codes::GOOD,
        JobStatus::Failed => codes::BAD,
        JobStatus::WaitingConfirmation | JobStatus::Running => codes::WARN,
        JobStatus::Pending | JobStatus::Cancelled => codes::CONTEXT,
    };
    paint(code, &status.to_string())
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
