//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Capture
//!
//! ```text
//! Capture → temp
//!     Size: 800x450
//!     URI: file:///home/me/.cache/CaptureBridge/IMG_20260116_093012x1Yz.jpg
//! ```
//!
//! Memory captures show the payload length and a short prefix instead of a URI:
//!
//! ```text
//! Capture → memory
//!     Size: 1920x1080
//!     Data: 412816 chars (/9j/4AAQSkZJRgABAQAAAQ…)
//! ```
//!
//! ## Resize
//!
//! ```text
//! Resized 1920x1080 → 450x800
//!     Source: shots/IMG_0001.jpg
//!     Output: /tmp/CaptureBridge/IMG_20260116_093012a8Kd2q.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::types::{CaptureResult, CaptureTarget, PictureSize};
use std::path::Path;

/// How many leading base64 characters to preview.
const DATA_PREVIEW_CHARS: usize = 24;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn target_label(target: CaptureTarget) -> &'static str {
    match target {
        CaptureTarget::Memory => "memory",
        CaptureTarget::Disk => "disk",
        CaptureTarget::CameraRoll => "camera roll",
        CaptureTarget::Temp => "temp",
    }
}

fn size_label(size: PictureSize) -> String {
    format!("{}x{}", size.width, size.height)
}

/// Truncate a base64 payload for display, marking the cut with `…`.
fn data_preview(data: &str) -> String {
    if data.len() <= DATA_PREVIEW_CHARS {
        data.to_string()
    } else {
        // base64 is ASCII, so any byte index is a char boundary.
        format!("{}\u{2026}", &data[..DATA_PREVIEW_CHARS])
    }
}

// ============================================================================
// Capture
// ============================================================================

pub fn format_capture_output(target: CaptureTarget, result: &CaptureResult) -> Vec<String> {
    let mut lines = vec![format!("Capture \u{2192} {}", target_label(target))];
    lines.push(format!("{}Size: {}", indent(1), size_label(result.size())));
    if let Some(uri) = &result.uri {
        lines.push(format!("{}URI: {}", indent(1), uri));
    }
    if let Some(data) = &result.data {
        lines.push(format!(
            "{}Data: {} chars ({})",
            indent(1),
            data.len(),
            data_preview(data)
        ));
    }
    lines
}

pub fn print_capture_output(target: CaptureTarget, result: &CaptureResult) {
    for line in format_capture_output(target, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Resize
// ============================================================================

pub fn format_resize_output(
    source: &Path,
    source_size: PictureSize,
    output: &Path,
    output_size: PictureSize,
) -> Vec<String> {
    vec![
        format!(
            "Resized {} \u{2192} {}",
            size_label(source_size),
            size_label(output_size)
        ),
        format!("{}Source: {}", indent(1), source.display()),
        format!("{}Output: {}", indent(1), output.display()),
    ]
}

pub fn print_resize_output(
    source: &Path,
    source_size: PictureSize,
    output: &Path,
    output_size: PictureSize,
) {
    for line in format_resize_output(source, source_size, output, output_size) {
        println!("{}", line);
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Pretty JSON, one line per entry.
pub fn format_constants(table: &serde_json::Value) -> Vec<String> {
    serde_json::to_string_pretty(table)
        .unwrap_or_else(|_| table.to_string())
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn print_constants(table: &serde_json::Value) {
    for line in format_constants(table) {
        println!("{}", line);
    }
}
