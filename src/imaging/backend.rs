//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the capture pipeline
//! needs from a bitmap library: identify, decode, read orientation, and the
//! scale-then-rotate transform.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and built on
//! the `image` crate.

use super::calculations::{exceeds_max_edge, is_degenerate};
use super::params::TransformParams;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Scale {scale} reduces the image to {width}x{height}, below the {min_edge}px minimum")]
    DegenerateScale {
        scale: f64,
        width: u32,
        height: u32,
        min_edge: u32,
    },
    #[error("Scale {scale} enlarges the image to {width}x{height}, above the {max_edge}px maximum")]
    OversizedScale {
        scale: f64,
        width: u32,
        height: u32,
        max_edge: u32,
    },
}

/// Result of an identify or transform operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded output bitmap and the dimensions it was measured at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// Every backend implements all four operations so the router and the
/// resize operation stay backend-agnostic.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an in-memory encoded image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Read the EXIF orientation value, if any. Never fails: unreadable or
    /// missing metadata is `None`.
    fn read_orientation(&self, path: &Path) -> Option<u16>;

    /// Decode `params.source`, scale, rotate, and encode as JPEG.
    ///
    /// The returned dimensions are measured on the rotated bitmap.
    fn transform(&self, params: &TransformParams) -> Result<EncodedImage, BackendError>;
}

/// Reject a scaled size outside `params.min_edge..=params.max_edge`.
///
/// Backends call this after decoding and before resampling, so a bad source
/// reports its decode error first and no oversized bitmap is ever allocated.
pub fn check_scaled_size(
    params: &TransformParams,
    scaled: (u32, u32),
) -> Result<(), BackendError> {
    if is_degenerate(scaled, params.min_edge) {
        return Err(BackendError::DegenerateScale {
            scale: params.scale,
            width: scaled.0,
            height: scaled.1,
            min_edge: params.min_edge,
        });
    }
    if exceeds_max_edge(scaled, params.max_edge) {
        return Err(BackendError::OversizedScale {
            scale: params.scale,
            width: scaled.0,
            height: scaled.1,
            max_edge: params.max_edge,
        });
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Quality, Rotation};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    ///
    /// `transform` reports dimensions computed from `source_dimensions`, the
    /// scale, and the rotation, the same way the real backend measures them.
    #[derive(Default)]
    pub struct MockBackend {
        pub source_dimensions: Mutex<Option<Dimensions>>,
        pub orientation: Mutex<Option<u16>>,
        pub fail_decode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Decode(usize),
        ReadOrientation(String),
        Transform {
            source: String,
            scale: f64,
            rotation: Rotation,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_source(width: u32, height: u32) -> Self {
            Self {
                source_dimensions: Mutex::new(Some(Dimensions { width, height })),
                ..Self::default()
            }
        }

        pub fn with_orientation(self, orientation: u16) -> Self {
            *self.orientation.lock().unwrap() = Some(orientation);
            self
        }

        pub fn failing_decode() -> Self {
            Self {
                fail_decode: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.source_dimensions
                .lock()
                .unwrap()
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))
        }

        fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(bytes.len()));
            if self.fail_decode {
                return Err(BackendError::Decode("mock decode failure".into()));
            }
            let dims = self.source_dimensions.lock().unwrap().unwrap_or(Dimensions {
                width: 1,
                height: 1,
            });
            Ok(DynamicImage::new_rgb8(dims.width, dims.height))
        }

        fn read_orientation(&self, path: &Path) -> Option<u16> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::ReadOrientation(path.to_string_lossy().to_string()));
            *self.orientation.lock().unwrap()
        }

        fn transform(&self, params: &TransformParams) -> Result<EncodedImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Transform {
                source: params.source.to_string_lossy().to_string(),
                scale: params.scale,
                rotation: params.rotation,
                quality: params.quality.value(),
            });
            if self.fail_decode {
                return Err(BackendError::Decode("mock decode failure".into()));
            }
            let src = self
                .source_dimensions
                .lock()
                .unwrap()
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))?;
            let scaled = crate::imaging::calculations::scaled_dimensions(
                (src.width, src.height),
                params.scale,
            );
            check_scaled_size(params, scaled)?;
            let (width, height) =
                crate::imaging::calculations::rotated_dimensions(scaled, params.rotation);
            Ok(EncodedImage {
                bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
                dimensions: Dimensions { width, height },
            })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_source(800, 600);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_transform_swaps_for_quarter_turn() {
        let backend = MockBackend::with_source(1920, 1080);

        let out = backend
            .transform(&TransformParams {
                source: "/tmp/source.jpg".into(),
                scale: 0.5,
                rotation: Rotation::Cw90,
                quality: Quality::MAX,
                min_edge: 1,
                max_edge: 16384,
            })
            .unwrap();

        assert_eq!(
            out.dimensions,
            Dimensions {
                width: 540,
                height: 960
            }
        );
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Transform {
                rotation: Rotation::Cw90,
                quality: 100,
                ..
            }
        ));
    }

    fn params(scale: f64, min_edge: u32, max_edge: u32) -> TransformParams {
        TransformParams {
            source: "/tmp/source.jpg".into(),
            scale,
            rotation: Rotation::None,
            quality: Quality::MAX,
            min_edge,
            max_edge,
        }
    }

    #[test]
    fn scaled_size_within_edges_passes() {
        assert!(check_scaled_size(&params(0.5, 1, 4096), (960, 540)).is_ok());
        assert!(check_scaled_size(&params(1.0, 8, 8), (8, 8)).is_ok());
    }

    #[test]
    fn scaled_size_below_min_edge_is_degenerate() {
        let err = check_scaled_size(&params(0.001, 8, 4096), (2, 1)).unwrap_err();
        assert!(matches!(
            err,
            BackendError::DegenerateScale { width: 2, height: 1, min_edge: 8, .. }
        ));
    }

    #[test]
    fn scaled_size_above_max_edge_is_oversized() {
        let err = check_scaled_size(&params(200.0, 1, 4096), (u32::MAX, 2000)).unwrap_err();
        assert!(matches!(err, BackendError::OversizedScale { max_edge: 4096, .. }));
        assert!(err.to_string().contains("above the 4096px maximum"), "{err}");
    }

    #[test]
    fn mock_transform_checks_size_after_decode() {
        let failing = MockBackend::failing_decode();
        assert!(matches!(
            failing.transform(&params(0.0001, 8, 4096)),
            Err(BackendError::Decode(_))
        ));

        let decodable = MockBackend::with_source(1920, 1080);
        assert!(matches!(
            decodable.transform(&params(0.0001, 8, 4096)),
            Err(BackendError::DegenerateScale { .. })
        ));
    }

    #[test]
    fn mock_decode_failure() {
        let backend = MockBackend::failing_decode();
        assert!(matches!(
            backend.decode(b"garbage"),
            Err(BackendError::Decode(_))
        ));
    }
}
