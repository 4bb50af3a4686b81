//! Shared test utilities for the capture-bridge test suite.
//!
//! Synthetic JPEG generation (with and without an EXIF orientation tag) plus
//! a recording preview port. Everything here builds images in memory so tests
//! never depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! write_jpeg(&path, &jpeg_bytes_with_orientation(64, 32, 6));
//! ```

use crate::capture::device::CameraDevice;
use crate::capture::preview::{CaptureGuard, PreviewPort};
use crate::naming::{MediaType, timestamped_stem};
use image::{ImageEncoder, RgbImage};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// Synthetic images
// =========================================================================

/// Red left half, blue right half. Survives JPEG well enough to check
/// which way a rotation went.
pub fn split_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgb([230, 20, 20])
        } else {
            image::Rgb([20, 20, 230])
        }
    })
}

/// Encode a synthetic image as baseline JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = split_image(width, height);
    let mut buffer = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// An APP1 segment (marker included) carrying a little-endian EXIF block
/// with a single Orientation entry.
pub fn exif_app1_segment(orientation: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    // TIFF header: II, 42, IFD0 at offset 8
    payload.extend_from_slice(b"II");
    payload.extend_from_slice(&42u16.to_le_bytes());
    payload.extend_from_slice(&8u32.to_le_bytes());
    // IFD0: one entry
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0x0112u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&orientation.to_le_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_le_bytes());

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

/// A JPEG with an EXIF orientation tag injected right after SOI.
pub fn jpeg_bytes_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let plain = jpeg_bytes(width, height);
    let mut out = plain[..2].to_vec();
    out.extend_from_slice(&exif_app1_segment(orientation));
    out.extend_from_slice(&plain[2..]);
    out
}

pub fn write_jpeg(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).unwrap();
}

/// Decode a file and return its dimensions.
pub fn decoded_dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

/// Put directories at the disk-capture names for the next `seconds`, so a
/// disk capture in that window cannot open its destination for writing.
pub fn occupy_disk_names(dir: &Path, seconds: i64) {
    let now = chrono::Local::now();
    for offset in 0..seconds {
        let stem = timestamped_stem(MediaType::Image, now + chrono::TimeDelta::seconds(offset));
        std::fs::create_dir_all(dir.join(format!("{stem}.jpg"))).unwrap();
    }
}

// =========================================================================
// Preview recording
// =========================================================================

/// What a [`RecordingPreview`] saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    Stop,
    Start { delay: Duration },
}

/// Preview port that records posts and runs them inline.
///
/// Start messages are executed immediately (no actual delay) so the
/// in-flight guard is released as soon as the worker is done.
#[derive(Default)]
pub struct RecordingPreview {
    pub events: Mutex<Vec<PreviewEvent>>,
}

impl RecordingPreview {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PreviewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn start_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PreviewEvent::Start { .. }))
            .count()
    }
}

impl PreviewPort for RecordingPreview {
    fn stop_preview(&self, device: Arc<dyn CameraDevice>) {
        self.events.lock().unwrap().push(PreviewEvent::Stop);
        let _ = device.stop_preview();
    }

    fn start_preview_after(
        &self,
        device: Arc<dyn CameraDevice>,
        delay: Duration,
        guard: Option<CaptureGuard>,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(PreviewEvent::Start { delay });
        let _ = device.start_preview();
        drop(guard);
    }
}
