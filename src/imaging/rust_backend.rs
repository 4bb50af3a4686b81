//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Scale | `image::imageops::resize` with `Triangle` (bilinear) filter |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | EXIF orientation | custom `exif_parser` (JPEG APP1 + TIFF IFD0) |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend, check_scaled_size};
use super::calculations::scaled_dimensions;
use super::params::{Quality, Rotation, TransformParams};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
}

/// Encode a bitmap as baseline JPEG.
///
/// JPEG has no alpha channel, so the bitmap is flattened to RGB8 first.
pub fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.as_u8());
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buffer)
}

fn rotate(img: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::None => img,
        Rotation::Cw90 => img.rotate90(),
        Rotation::Cw180 => img.rotate180(),
        Rotation::Cw270 => img.rotate270(),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn read_orientation(&self, path: &Path) -> Option<u16> {
        super::exif_parser::read_orientation(path)
    }

    fn transform(&self, params: &TransformParams) -> Result<EncodedImage, BackendError> {
        let photo = load_image(&params.source)?;
        let (src_w, src_h) = photo.dimensions();

        let (scaled_w, scaled_h) = scaled_dimensions((src_w, src_h), params.scale);
        check_scaled_size(params, (scaled_w, scaled_h))?;

        let scaled = if (scaled_w, scaled_h) == (src_w, src_h) {
            photo
        } else {
            let resized = photo.resize_exact(scaled_w, scaled_h, FilterType::Triangle);
            drop(photo);
            resized
        };
        let transformed = rotate(scaled, params.rotation);

        let dimensions = Dimensions {
            width: transformed.width(),
            height: transformed.height(),
        };
        debug!(
            source = %params.source.display(),
            scale = params.scale,
            rotation = params.rotation.degrees(),
            width = dimensions.width,
            height = dimensions.height,
            "Transformed capture"
        );

        let bytes = encode_jpeg(&transformed, params.quality)?;
        // Release the full bitmap before the caller does file I/O.
        drop(transformed);

        Ok(EncodedImage { bytes, dimensions })
    }
}
