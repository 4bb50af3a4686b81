//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_scale_factor;
use super::params::{Quality, Rotation, TransformParams};
use crate::naming::{MediaFile, MediaType, allocate_unique_file};
use crate::types::PictureSize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<PictureSize> {
    let dims = backend.identify(path)?;
    Ok(PictureSize::new(dims.width, dims.height))
}

/// Bounds for the temp-capture resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeBounds {
    /// 0 = unconstrained.
    pub max_width: u32,
    /// 0 = unconstrained.
    pub max_height: u32,
    /// Smallest acceptable output edge; smaller results are rejected.
    pub min_edge: u32,
    /// Largest acceptable output edge; larger results are rejected.
    pub max_edge: u32,
}

impl ResizeBounds {
    /// Default ceiling on an output edge, in pixels.
    pub const DEFAULT_MAX_EDGE: u32 = 16384;

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            min_edge: 1,
            max_edge: Self::DEFAULT_MAX_EDGE,
        }
    }
}

/// Plan a resize without executing it.
///
/// Reads the EXIF orientation through the backend (missing or unreadable
/// metadata is upright) and computes the uniform scale from the source size.
/// The output edge limits travel in the params; the backend enforces them
/// once the source has decoded.
pub fn plan_resize(
    backend: &impl ImageBackend,
    source: &Path,
    source_size: PictureSize,
    bounds: ResizeBounds,
) -> Result<TransformParams> {
    let src = (source_size.width, source_size.height);
    let scale = calculate_scale_factor(src, (bounds.max_width, bounds.max_height));

    let rotation = match backend.read_orientation(source) {
        Some(value) => Rotation::from_exif_orientation(value),
        None => {
            debug!(source = %source.display(), "No EXIF orientation, assuming upright");
            Rotation::None
        }
    };

    Ok(TransformParams {
        source: source.to_path_buf(),
        scale,
        rotation,
        quality: Quality::MAX,
        min_edge: bounds.min_edge,
        max_edge: bounds.max_edge,
    })
}

/// Resize a captured image to fit `bounds`, honoring its EXIF orientation.
///
/// Writes the result as a maximum-quality JPEG into a fresh file in
/// `output_dir` and returns that file with the dimensions of the rotated
/// output (a quarter turn swaps width and height).
///
/// The source file is left in place.
pub fn resize_image(
    backend: &impl ImageBackend,
    source: &Path,
    source_size: PictureSize,
    bounds: ResizeBounds,
    output_dir: &Path,
) -> Result<(MediaFile, PictureSize)> {
    let params = plan_resize(backend, source, source_size, bounds)?;
    let encoded = backend.transform(&params)?;

    let file = allocate_unique_file(output_dir, MediaType::Image)?;
    let write = std::fs::File::create(&file.path).and_then(|mut out| {
        out.write_all(&encoded.bytes)?;
        out.flush()
    });
    if let Err(e) = write {
        warn!(path = %file.path.display(), error = %e, "Failed to write resized capture");
        return Err(BackendError::Io(e));
    }

    let size = PictureSize::new(encoded.dimensions.width, encoded.dimensions.height);
    debug!(
        path = %file.path.display(),
        width = size.width,
        height = size.height,
        rotation = params.rotation.degrees(),
        "Resized capture written"
    );
    Ok((file, size))
}
