//! Capture router: sends one captured still to its destination.
//!
//! | Target | Destination | Result |
//! |---|---|---|
//! | `Memory` | base64 in the response | `data`, native size |
//! | `Disk` | `<pictures>/<album>/IMG_<timestamp>.jpg`, bytes verbatim | `uri`, native size |
//! | `CameraRoll` | decoded and handed to the [`MediaLibrary`] | `uri`, native size |
//! | `Temp` | unique temp file, then resized to the configured bounds | `uri`, resized size |
//!
//! Nothing is rolled back. A temp capture whose resize fails leaves the
//! un-resized temp file behind.

use super::device::DeviceError;
use super::media_library::{MediaLibrary, MediaStoreError};
use crate::config::BridgeConfig;
use crate::imaging::{BackendError, ImageBackend, ResizeBounds, resize_image};
use crate::naming::{MediaType, allocate_output_file, allocate_unique_file};
use crate::types::{CaptureOptions, CaptureResult, CaptureTarget, PictureSize};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Destination file failures. The messages are part of the host contract.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Error creating media file.")]
    CreateMediaFile,
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Error accessing file: {0}")]
    Access(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No camera found.")]
    NoCamera,
    #[error(transparent)]
    File(#[from] FileError),
    #[error("Could not decode captured image: {0}")]
    Decode(String),
    #[error("Error resizing image: {0}")]
    Resize(#[from] BackendError),
    #[error(transparent)]
    MediaStore(#[from] MediaStoreError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("Capture already in progress.")]
    Busy,
    #[error("Invalid capture options: {0}")]
    InvalidOptions(String),
    #[error("Capture was interrupted.")]
    Interrupted,
}

pub struct Router<B> {
    backend: B,
    media_library: Box<dyn MediaLibrary>,
    album_dir: PathBuf,
    temp_dir: PathBuf,
    bounds: ResizeBounds,
}

impl<B: ImageBackend> Router<B> {
    pub fn new(
        backend: B,
        media_library: Box<dyn MediaLibrary>,
        album_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
        bounds: ResizeBounds,
    ) -> Self {
        Self {
            backend,
            media_library,
            album_dir: album_dir.into(),
            temp_dir: temp_dir.into(),
            bounds,
        }
    }

    /// Router with destinations and bounds taken from `config`.
    pub fn from_config(
        backend: B,
        media_library: Box<dyn MediaLibrary>,
        config: &BridgeConfig,
    ) -> Self {
        Self::new(
            backend,
            media_library,
            config.storage.album_dir(),
            config.storage.temp_dir(),
            config.resize.bounds(),
        )
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Route `bytes` (an encoded JPEG) per `options.target`.
    ///
    /// `native_size` is the device's configured picture size. It is reported
    /// as-is for every target except `Temp`, which reports the resized size.
    pub fn route(
        &self,
        bytes: &[u8],
        options: &CaptureOptions,
        native_size: PictureSize,
    ) -> Result<CaptureResult, CaptureError> {
        debug!(
            target_kind = ?options.target,
            bytes = bytes.len(),
            width = native_size.width,
            height = native_size.height,
            "Routing capture"
        );
        match options.target {
            CaptureTarget::Memory => {
                Ok(CaptureResult::with_data(native_size, BASE64.encode(bytes)))
            }
            CaptureTarget::CameraRoll => self.to_camera_roll(bytes, options, native_size),
            CaptureTarget::Disk => self.to_disk(bytes, native_size),
            CaptureTarget::Temp => self.to_temp(bytes, native_size),
        }
    }

    fn to_camera_roll(
        &self,
        bytes: &[u8],
        options: &CaptureOptions,
        native_size: PictureSize,
    ) -> Result<CaptureResult, CaptureError> {
        let bitmap = self
            .backend
            .decode(bytes)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        let uri = self.media_library.insert_image(
            &bitmap,
            options.title.as_deref(),
            options.description.as_deref(),
        )?;
        Ok(CaptureResult::with_uri(native_size, uri))
    }

    fn to_disk(
        &self,
        bytes: &[u8],
        native_size: PictureSize,
    ) -> Result<CaptureResult, CaptureError> {
        let file = allocate_output_file(&self.album_dir, MediaType::Image).map_err(|e| {
            error!(dir = %self.album_dir.display(), error = %e, "Failed to create media directory");
            FileError::CreateMediaFile
        })?;
        write_capture(&file.path, bytes)?;
        info!(path = %file.path.display(), "Capture saved");
        Ok(CaptureResult::with_uri(native_size, file.uri()))
    }

    fn to_temp(
        &self,
        bytes: &[u8],
        native_size: PictureSize,
    ) -> Result<CaptureResult, CaptureError> {
        let source = allocate_unique_file(&self.temp_dir, MediaType::Image).map_err(|e| {
            error!(dir = %self.temp_dir.display(), error = %e, "Failed to create temp file");
            FileError::CreateMediaFile
        })?;
        write_capture(&source.path, bytes)?;

        let (resized, size) =
            resize_image(&self.backend, &source.path, native_size, self.bounds, &self.temp_dir)?;
        info!(
            path = %resized.path.display(),
            width = size.width,
            height = size.height,
            "Temp capture resized"
        );
        Ok(CaptureResult::with_uri(size, resized.uri()))
    }
}

fn write_capture(path: &Path, bytes: &[u8]) -> Result<(), FileError> {
    let mut out = std::fs::File::create(path).map_err(|e| FileError::NotFound(e.to_string()))?;
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|e| FileError::Access(e.to_string()))
}
