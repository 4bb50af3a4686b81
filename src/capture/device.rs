//! Camera device seam.
//!
//! The session never talks to camera hardware directly. It asks a
//! [`CameraProvider`] for a [`CameraDevice`] and drives it through this
//! trait. [`ReplayCamera`] is the in-tree implementation: it "captures" a
//! fixed encoded still, which is what the CLI and the integration tests use.

use crate::types::{CameraType, CaptureQuality, PictureSize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Camera is busy: {0}")]
    Busy(String),
    #[error("Camera failure: {0}")]
    Failed(String),
}

/// Invoked once with the encoded still.
pub type PictureCallback = Box<dyn FnOnce(Vec<u8>) + Send + 'static>;

/// One physical camera.
///
/// `take_picture` must return promptly and deliver the bytes on a thread of
/// its own choosing. Preview calls are only made from the preview queue.
pub trait CameraDevice: Send + Sync {
    /// Native picture size the device is configured for.
    fn picture_size(&self) -> PictureSize;

    fn set_capture_quality(&self, quality: CaptureQuality);

    fn take_picture(&self, on_taken: PictureCallback) -> Result<(), DeviceError>;

    fn stop_preview(&self) -> Result<(), DeviceError>;

    fn start_preview(&self) -> Result<(), DeviceError>;
}

/// Hands out camera devices by facing.
pub trait CameraProvider: Send + Sync {
    /// `None` when no camera of that type exists.
    fn acquire(&self, camera_type: CameraType) -> Option<Arc<dyn CameraDevice>>;
}

// ---------------------------------------------------------------------------
// Replay camera
// ---------------------------------------------------------------------------

/// A camera that returns the same encoded still on every capture.
///
/// Stills are delivered from a dedicated callback thread, like a hardware
/// shutter callback. Preview stop/start calls are counted so callers can
/// verify the preview was handed back.
pub struct ReplayCamera {
    still: Arc<Vec<u8>>,
    size: PictureSize,
    quality: Mutex<Option<CaptureQuality>>,
    preview_stops: AtomicUsize,
    preview_starts: AtomicUsize,
}

impl ReplayCamera {
    pub fn new(still: Vec<u8>, size: PictureSize) -> Self {
        Self {
            still: Arc::new(still),
            size,
            quality: Mutex::new(None),
            preview_stops: AtomicUsize::new(0),
            preview_starts: AtomicUsize::new(0),
        }
    }

    /// Load a still from disk, taking the picture size from the image header.
    pub fn from_file(path: &Path) -> Result<Self, crate::imaging::BackendError> {
        let bytes = std::fs::read(path)?;
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| crate::imaging::BackendError::Decode(e.to_string()))?;
        Ok(Self::new(bytes, PictureSize::new(width, height)))
    }

    pub fn preview_stops(&self) -> usize {
        self.preview_stops.load(Ordering::SeqCst)
    }

    pub fn preview_starts(&self) -> usize {
        self.preview_starts.load(Ordering::SeqCst)
    }

    /// Quality last requested by the session.
    pub fn capture_quality(&self) -> Option<CaptureQuality> {
        *self.quality.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CameraDevice for ReplayCamera {
    fn picture_size(&self) -> PictureSize {
        self.size
    }

    fn set_capture_quality(&self, quality: CaptureQuality) {
        *self.quality.lock().unwrap_or_else(|e| e.into_inner()) = Some(quality);
    }

    fn take_picture(&self, on_taken: PictureCallback) -> Result<(), DeviceError> {
        let still = Arc::clone(&self.still);
        std::thread::Builder::new()
            .name("camera-callback".into())
            .spawn(move || on_taken(still.as_ref().clone()))
            .map(|_| ())
            .map_err(|e| DeviceError::Failed(format!("failed to spawn callback thread: {e}")))
    }

    fn stop_preview(&self) -> Result<(), DeviceError> {
        let n = self.preview_stops.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(stops = n, "Preview stopped");
        Ok(())
    }

    fn start_preview(&self) -> Result<(), DeviceError> {
        let n = self.preview_starts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(starts = n, "Preview started");
        Ok(())
    }
}

/// Provider backed by a fixed set of devices.
#[derive(Default)]
pub struct StaticProvider {
    devices: HashMap<CameraType, Arc<dyn CameraDevice>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, camera_type: CameraType, device: Arc<dyn CameraDevice>) -> Self {
        self.devices.insert(camera_type, device);
        self
    }
}

impl CameraProvider for StaticProvider {
    fn acquire(&self, camera_type: CameraType) -> Option<Arc<dyn CameraDevice>> {
        self.devices.get(&camera_type).cloned()
    }
}
