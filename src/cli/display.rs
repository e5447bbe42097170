// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display helpers for the mojigram CLI.
//!
//! Color only when stdout is a real terminal and `NO_COLOR` is unset; plain
//! text for pipelines. Nothing clever beyond that.

use std::sync::OnceLock;

static COLOR: OnceLock<bool> = OnceLock::new();

/// Whether to emit ANSI color codes.
pub fn color_enabled() -> bool {
    *COLOR.get_or_init(|| {
        std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
    })
}

fn paint(text: &str, code: &str) -> String {
    if color_enabled() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

pub fn bold(text: &str) -> String {
    paint(text, "1")
}

pub fn green(text: &str) -> String {
    paint(text, "32")
}

pub fn red(text: &str) -> String {
    paint(text, "31")
}

pub fn dim(text: &str) -> String {
    paint(text, "2")
}

pub fn cyan(text: &str) -> String {
    paint(text, "36")
}

/// 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Byte count with a binary unit suffix.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}
